//! Path → quiz id table.
//!
//! Public links look like `/quiz/aula-2` or `/quiz/diagnostico-2`. Anything
//! that does not match falls back to the first lesson.

use crate::model::QuizId;

/// Slug used when a path is missing or unrecognized.
pub const DEFAULT_SLUG: &str = "aula-1";

const ROUTES: [(&str, &str); 6] = [
    ("aula-1", "quiz-1"),
    ("aula-2", "quiz-2"),
    ("aula-3", "quiz-3"),
    ("diagnostico-1", "quiz-1"),
    ("diagnostico-2", "quiz-2"),
    ("diagnostico-3", "quiz-3"),
];

/// Outcome of routing a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub slug: String,
    pub quiz_id: QuizId,
    /// True when the requested path did not match and the default was used.
    pub fell_back: bool,
}

/// Quiz id for a known slug.
#[must_use]
pub fn quiz_for_slug(slug: &str) -> Option<QuizId> {
    ROUTES
        .iter()
        .find(|(candidate, _)| *candidate == slug)
        .map(|(_, quiz)| QuizId::from_static(*quiz))
}

/// Resolve a request path such as `/quiz/aula-3`.
///
/// Query strings, fragments and trailing slashes are ignored.
#[must_use]
pub fn resolve_path(path: &str) -> Route {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let mut segments = path.split('/').filter(|segment| !segment.is_empty());

    let requested = match (segments.next(), segments.next(), segments.next()) {
        (Some("quiz"), Some(slug), None) => Some(slug),
        _ => None,
    };

    if let Some(slug) = requested {
        if let Some(quiz_id) = quiz_for_slug(slug) {
            return Route {
                slug: slug.to_string(),
                quiz_id,
                fell_back: false,
            };
        }
    }

    default_route()
}

fn default_route() -> Route {
    Route {
        slug: DEFAULT_SLUG.to_string(),
        quiz_id: QuizId::from_static("quiz-1"),
        fell_back: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_slugs_map_to_quizzes() {
        let route = resolve_path("/quiz/diagnostico-3");
        assert_eq!(route.quiz_id.as_str(), "quiz-3");
        assert!(!route.fell_back);

        let route = resolve_path("/quiz/aula-2/?utm_source=whatsapp");
        assert_eq!(route.quiz_id.as_str(), "quiz-2");
        assert_eq!(route.slug, "aula-2");
    }

    #[test]
    fn unknown_paths_fall_back_to_first_lesson() {
        for path in ["/", "", "/quiz/aula-9", "/other", "/quiz/aula-1/extra"] {
            let route = resolve_path(path);
            assert_eq!(route.quiz_id.as_str(), "quiz-1", "{path}");
            assert!(route.fell_back, "{path}");
        }
    }
}
