//! Static quiz catalog.
//!
//! The builtin catalog carries the three lessons of the course funnel. Each
//! quiz has six questions worth 0..=3 points, so scores run from 0 to 18.

use std::collections::BTreeMap;

use thiserror::Error;

use serde::Deserialize;

use crate::model::{
    AnswerOption, CallToAction, MenuEntry, MenuLock, OptionId, ParseIdError, Question, QuestionId,
    QuizDefinition, QuizDraft, QuizError, QuizId, ResultBand,
};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("invalid catalog json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("quiz {id} is invalid: {source}")]
    Quiz {
        id: QuizId,
        #[source]
        source: QuizError,
    },

    #[error("quiz {0} is defined more than once")]
    Duplicate(QuizId),

    #[error(transparent)]
    InvalidId(#[from] ParseIdError),

    #[error("menu entry {step} points at unknown quiz {quiz_id}")]
    UnknownMenuQuiz { step: u32, quiz_id: QuizId },
}

/// Accepted shapes of a catalog file: a bare quiz list, or quizzes plus a menu.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Quizzes(Vec<QuizDraft>),
    Full {
        quizzes: Vec<QuizDraft>,
        #[serde(default)]
        menu: Vec<MenuEntry>,
    },
}

/// Read-only mapping from quiz id to definition.
#[derive(Debug, Clone, Default)]
pub struct QuizCatalog {
    quizzes: BTreeMap<QuizId, QuizDefinition>,
    menu: Vec<MenuEntry>,
}

impl QuizCatalog {
    /// Build a catalog from drafts, validating each quiz.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Quiz` for the first invalid quiz and
    /// `CatalogError::Duplicate` if two drafts share an id.
    pub fn from_drafts(drafts: impl IntoIterator<Item = QuizDraft>) -> Result<Self, CatalogError> {
        let mut quizzes = BTreeMap::new();
        for draft in drafts {
            let id = draft.id.clone();
            let quiz = draft.validate().map_err(|source| CatalogError::Quiz {
                id: id.clone(),
                source,
            })?;
            if quizzes.insert(id.clone(), quiz).is_some() {
                return Err(CatalogError::Duplicate(id));
            }
        }
        Ok(Self {
            quizzes,
            menu: Vec::new(),
        })
    }

    /// Attach the lesson menu, ordered by `step`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownMenuQuiz` if an entry names a quiz that
    /// is not in the catalog.
    pub fn with_menu(mut self, mut menu: Vec<MenuEntry>) -> Result<Self, CatalogError> {
        if let Some(entry) = menu.iter().find(|entry| !self.quizzes.contains_key(&entry.quiz_id)) {
            return Err(CatalogError::UnknownMenuQuiz {
                step: entry.step,
                quiz_id: entry.quiz_id.clone(),
            });
        }
        menu.sort_by_key(|entry| entry.step);
        self.menu = menu;
        Ok(self)
    }

    /// Parse a catalog from JSON: either an array of quizzes or an object
    /// `{"quizzes": [...], "menu": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the JSON is malformed, a quiz fails
    /// validation, or the menu names an unknown quiz.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        match file {
            CatalogFile::Quizzes(drafts) => Self::from_drafts(drafts),
            CatalogFile::Full { quizzes, menu } => Self::from_drafts(quizzes)?.with_menu(menu),
        }
    }

    /// The three course quizzes.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` only if the bundled data breaks a quiz invariant.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_drafts([quiz_one()?, quiz_two()?, quiz_three()?])?.with_menu(builtin_menu()?)
    }

    #[must_use]
    pub fn lookup(&self, id: &QuizId) -> Option<&QuizDefinition> {
        self.quizzes.get(id)
    }

    /// Lesson menu entries in course order. Empty when none was configured.
    #[must_use]
    pub fn menu(&self) -> &[MenuEntry] {
        &self.menu
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuizDefinition> {
        self.quizzes.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }
}

//
// ─── BUILTIN DATA ──────────────────────────────────────────────────────────────
//

fn quiz_id(raw: &str) -> Result<QuizId, CatalogError> {
    Ok(raw.parse()?)
}

fn question(id: u32, text: &str, options: [&str; 4]) -> Question {
    Question {
        id: QuestionId::new(id),
        text: text.to_string(),
        options: OptionId::ALL
            .into_iter()
            .zip(options)
            .zip(0_u32..)
            .map(|((id, text), points)| AnswerOption {
                id,
                text: text.to_string(),
                points,
            })
            .collect(),
    }
}

fn band(min: u32, max: u32, tone: &str, status: &str, description: &str, next_step: &str) -> ResultBand {
    ResultBand {
        min,
        max,
        status: status.to_string(),
        description: description.to_string(),
        next_step: next_step.to_string(),
        color_var: format!("--color-{tone}"),
        bg_var: format!("--color-{tone}-bg"),
    }
}

const RISK: &str = "🔴 Zona de Risco";
const DEVELOPING: &str = "🟡 Em Desenvolvimento";
const READY: &str = "🟢 Pronto pra Evoluir";

fn community_link() -> Option<CallToAction> {
    Some(CallToAction {
        title: "ENTRAR NO GRUPO OFICIAL".into(),
        link: "https://sndflw.com/i/P8zAlkUCVgbHma2u7Tk2".into(),
    })
}

fn builtin_menu() -> Result<Vec<MenuEntry>, CatalogError> {
    Ok(vec![
        MenuEntry {
            step: 1,
            quiz_id: quiz_id("quiz-1")?,
            title: "Diagnóstico de Dependência".into(),
            teaser: "Descubra o que te impede de ver outras opções além do enxerto.".into(),
            lock: None,
        },
        MenuEntry {
            step: 2,
            quiz_id: quiz_id("quiz-2")?,
            title: "Mapa dos 3 Pilares".into(),
            teaser: String::new(),
            lock: Some(MenuLock {
                note: "Liberado na Aula 2 (04/02)".into(),
                message: "🔒 Opa! Esse diagnóstico será liberado na Aula 2 (Quarta-feira, 04/02). Fique atento!".into(),
            }),
        },
        MenuEntry {
            step: 3,
            quiz_id: quiz_id("quiz-3")?,
            title: "Termômetro dos 5 Erros".into(),
            teaser: String::new(),
            lock: Some(MenuLock {
                note: "Liberado na Aula 3 (05/02)".into(),
                message: "🔒 Calma doutor(a)! Esse aqui só libera na Aula 3 (Quinta-feira, 05/02).".into(),
            }),
        },
    ])
}

fn quiz_one() -> Result<QuizDraft, CatalogError> {
    Ok(QuizDraft {
        id: quiz_id("quiz-1")?,
        title: "Diagnóstico de Dependência".into(),
        subtitle: "Descubra se você está preso a um único caminho".into(),
        questions: vec![
            question(
                1,
                "Quando você recebe um caso de maxila atrófica, qual é sua primeira reação?",
                [
                    "Já penso direto em enxerto — é o que eu domino",
                    "Avalio se dá pra fazer enxerto ou encaminhar",
                    "Analiso algumas alternativas antes de decidir",
                    "Mapear múltiplas opções antes de decidir faz parte do meu processo",
                ],
            ),
            question(
                2,
                "Nos últimos 3 meses, quantos casos você deixou de fazer (ou encaminhou) por não ter segurança técnica?",
                [
                    "Mais de 5 casos",
                    "Entre 3 e 5 casos",
                    "Entre 1 e 2 casos",
                    "Nenhum — consigo resolver a maioria",
                ],
            ),
            question(
                3,
                "Se um paciente pergunta \"Doutor, existe outra opção além do enxerto?\", como você se sente?",
                [
                    "Desconfortável — não tenho muitas alternativas pra oferecer",
                    "Consigo explicar uma ou duas opções, mas sem muita segurança",
                    "Tenho algumas opções, mas gostaria de dominar mais",
                    "Seguro — consigo apresentar um leque de possibilidades",
                ],
            ),
            question(
                4,
                "Como você descreveria seu arsenal técnico atual para casos complexos?",
                [
                    "Limitado — basicamente enxertos e implantes convencionais",
                    "Razoável — conheço algumas técnicas mas não domino",
                    "Bom — tenho algumas opções que uso com frequência",
                    "Amplo — domino múltiplas técnicas e sei quando usar cada uma",
                ],
            ),
            question(
                5,
                "Quando surge uma complicação no meio de uma cirurgia, qual sua reação típica?",
                [
                    "Fico travado — geralmente não tenho plano B",
                    "Tento improvisar, mas nem sempre funciona",
                    "Tenho algumas alternativas, depende do caso",
                    "Já entro com planos A, B e C mapeados",
                ],
            ),
            question(
                6,
                "Se você pudesse resolver UM problema na sua prática clínica hoje, qual seria?",
                [
                    "Parar de depender tanto de enxertos demorados",
                    "Ter mais segurança para aceitar casos complexos",
                    "Aumentar meu repertório de técnicas",
                    "Aperfeiçoar o que já faço e ganhar mais previsibilidade",
                ],
            ),
        ],
        results: vec![
            band(
                0,
                6,
                "risk",
                RISK,
                "Você está preso a um único caminho. Sua prática atual depende muito de uma única abordagem — e isso está te limitando. Casos estão sendo perdidos, pacientes encaminhados, e a insegurança técnica está travando seu crescimento. A boa notícia? Você não precisa de mais cursos soltos. Precisa de um MÉTODO que te dê opções.",
                "Na próxima aula (Quarta, 04/02 às 20h), você vai descobrir O CAMINHO para sair dessa zona.",
            ),
            band(
                7,
                12,
                "dev",
                DEVELOPING,
                "Você já sabe que precisa de mais opções — mas ainda não tem um método. Você não está no zero. Já busca alternativas, já tenta se atualizar. Mas falta uma estrutura clara que conecte tudo isso em um sistema previsível. Você está no caminho certo, mas ainda operando com peças soltas.",
                "Na próxima aula (Quarta, 04/02 às 20h), vou mostrar como estruturar isso em 3 Pilares.",
            ),
            band(
                13,
                18,
                "ready",
                READY,
                "Você já tem consciência — agora precisa do método certo. Seu diagnóstico mostra que você entende a importância de ter opções e já não opera no \"piloto automático\". Isso te coloca à frente da maioria. O próximo passo é transformar essa consciência em um sistema estruturado de tomada de decisão.",
                "Na próxima aula (Quarta, 04/02 às 20h), você vai conhecer os 3 Pilares que vão organizar tudo isso.",
            ),
        ],
        call_to_action: Some(CallToAction {
            title: "ATIVAR LEMBRETE AULA 02".into(),
            link: "https://www.youtube.com/watch?v=OA6ZG44N-6s".into(),
        }),
        community_link: community_link(),
    })
}

fn quiz_two() -> Result<QuizDraft, CatalogError> {
    Ok(QuizDraft {
        id: quiz_id("quiz-2")?,
        title: "Mapa dos 3 Pilares".into(),
        subtitle: "Descubra qual pilar está travando sua evolução".into(),
        questions: vec![
            question(
                1,
                "Como você classificaria seu domínio TEÓRICO sobre técnicas avançadas (All-on-4, zigomático, pterigóide)?",
                [
                    "Superficial — ouvi falar mas nunca estudei a fundo",
                    "Básico — fiz um curso ou outro mas não fixou",
                    "Intermediário — entendo a teoria mas falta prática",
                    "Sólido — domino os conceitos e fundamentos",
                ],
            ),
            question(
                2,
                "Quando você assiste uma aula ou curso online, o que acontece depois?",
                [
                    "Esqueço a maior parte em poucas semanas",
                    "Lembro de alguns conceitos mas não aplico",
                    "Consigo aplicar parte do conteúdo",
                    "Tenho um sistema pra revisar e aplicar o que aprendo",
                ],
            ),
            question(
                3,
                "Antes de uma cirurgia complexa, qual seu nível de planejamento?",
                [
                    "Vou mais no feeling — confio na experiência",
                    "Faço um planejamento básico mental",
                    "Planejo com imagens mas sem simular cenários alternativos",
                    "Simulo múltiplos cenários e já tenho planos de contingência",
                ],
            ),
            question(
                4,
                "Você já treinou em modelos, cursos hands-on ou simuladores antes de executar uma técnica nova em paciente?",
                [
                    "Nunca — aprendo direto no paciente",
                    "Raramente — só quando surge oportunidade",
                    "Às vezes — quando é algo muito diferente",
                    "Sempre — não executo sem ter treinado antes",
                ],
            ),
            question(
                5,
                "Você já operou com supervisão/mentoria de alguém mais experiente em técnicas que estava aprendendo?",
                [
                    "Nunca — sempre aprendi sozinho",
                    "Uma ou duas vezes na faculdade/residência",
                    "Sim, em alguns cursos presenciais",
                    "Sim, tenho ou tive mentoria contínua",
                ],
            ),
            question(
                6,
                "Quando você tem dúvida sobre um caso complexo, o que você faz?",
                [
                    "Tento resolver sozinho ou encaminho",
                    "Pesquiso na internet / grupos de WhatsApp",
                    "Tenho alguns colegas que consulto informalmente",
                    "Tenho acesso a mentores/especialistas que me orientam",
                ],
            ),
        ],
        results: vec![
            band(
                0,
                6,
                "risk",
                RISK,
                "Seus 3 Pilares precisam de atenção urgente. O diagnóstico mostra gaps importantes em Conhecimento, Simulação e Experiência Guiada. Você está tentando evoluir sem a base necessária — é como construir um prédio sem fundação. Não é falta de vontade. É falta de MÉTODO.",
                "Na próxima aula (Quinta, 05/02 às 20h), vou revelar os 5 ERROS que estão te travando — e como evitá-los.",
            ),
            band(
                7,
                12,
                "dev",
                DEVELOPING,
                "Você tem alguns pilares mais fortes que outros — e isso cria desequilíbrio. Provavelmente você investe em conhecimento (cursos, conteúdos) mas falta simulação prática. Ou tem experiência mas falta atualização teórica. Esse desequilíbrio trava sua evolução.",
                "Na próxima aula (Quinta, 05/02 às 20h), você vai descobrir os erros que mantêm esse desequilíbrio.",
            ),
            band(
                13,
                18,
                "ready",
                READY,
                "Seus pilares estão bem estruturados — você está pronto pro próximo nível. Seu diagnóstico mostra que você já entende a importância de Conhecimento + Simulação + Experiência Guiada. Você não é mais iniciante. O próximo passo é acelerar essa evolução com o método certo.",
                "Na próxima aula (Quinta, 05/02 às 20h), vou mostrar os 5 erros que travam ATÉ profissionais experientes.",
            ),
        ],
        call_to_action: Some(CallToAction {
            title: "ATIVAR LEMBRETE AULA 03".into(),
            link: "#".into(),
        }),
        community_link: community_link(),
    })
}

fn quiz_three() -> Result<QuizDraft, CatalogError> {
    Ok(QuizDraft {
        id: quiz_id("quiz-3")?,
        title: "Termômetro dos 5 Erros".into(),
        subtitle: "Descubra o que está sabotando sua evolução".into(),
        questions: vec![
            question(
                1,
                "\"Minha realidade é diferente\" — Você já usou essa frase pra justificar por que uma técnica não funcionaria pra você?",
                [
                    "Sim, sempre — meus pacientes e estrutura são diferentes",
                    "Frequentemente — acho que minha cidade/público é diferente",
                    "Às vezes penso isso, mas tento adaptar",
                    "Raramente — sei que é mais sobre método do que contexto",
                ],
            ),
            question(
                2,
                "Você já tentou aplicar uma técnica avançada \"pulando etapas\" do aprendizado?",
                [
                    "Sim — fui direto pro avançado sem dominar o básico",
                    "Já tentei acelerar algumas vezes",
                    "Às vezes pulo quando me sinto confiante",
                    "Não — respeito a sequência de aprendizado",
                ],
            ),
            question(
                3,
                "Como está sua formação hoje: mais parecida com um MÉTODO estruturado ou com PEÇAS SOLTAS?",
                [
                    "Totalmente peças soltas — cursos aleatórios sem conexão",
                    "Mais peças soltas do que método",
                    "Meio a meio — tenho alguma estrutura",
                    "Tenho um método claro que conecta tudo",
                ],
            ),
            question(
                4,
                "Você já adiou uma decisão de investir na sua evolução esperando o \"momento perfeito\"?",
                [
                    "Sempre — nunca é o momento certo",
                    "Frequentemente — espero sobrar tempo/dinheiro",
                    "Às vezes adio, mas acabo fazendo",
                    "Não — quando decido, executo",
                ],
            ),
            question(
                5,
                "Você está tentando evoluir sozinho ou tem algum tipo de mentoria/acompanhamento?",
                [
                    "Totalmente sozinho — nunca tive mentor",
                    "Sozinho, mas assisto conteúdos online",
                    "Tenho alguns colegas que troco ideia",
                    "Tenho ou busco mentoria estruturada",
                ],
            ),
            question(
                6,
                "Olhando pra sua jornada dos últimos 2 anos, você diria que está evoluindo no ritmo que gostaria?",
                [
                    "Não — sinto que estou estagnado",
                    "Pouco — evoluo devagar demais",
                    "Razoável — mas poderia ser mais rápido",
                    "Sim — estou satisfeito com minha evolução",
                ],
            ),
        ],
        results: vec![
            band(
                0,
                6,
                "risk",
                RISK,
                "Você está cometendo vários dos 5 erros — e isso explica por que se sente travado. Não é falta de capacidade. É um padrão de comportamentos que sabota sua evolução sem você perceber: esperar o momento perfeito, pular etapas, aprender sozinho...",
                "Domingo (08/02 às 20h) — Vou apresentar O PLANO completo pra você sair dessa zona.",
            ),
            band(
                7,
                12,
                "dev",
                DEVELOPING,
                "Você reconhece alguns erros — e isso já te coloca em vantagem. Você não está no piloto automático. Já percebe que algumas coisas precisam mudar. Mas entre perceber e AGIR existe um gap que só um método estruturado resolve.",
                "Domingo (08/02 às 20h) — Vou mostrar O CAMINHO pra transformar consciência em resultado.",
            ),
            band(
                13,
                18,
                "ready",
                READY,
                "Você está consciente e pronto — só falta o veículo certo. Seu diagnóstico mostra que você já evita a maioria dos erros comuns. Você entende a importância de método, mentoria e consistência. Está no grupo dos que realmente podem acelerar.",
                "Domingo (08/02 às 20h) — Vou apresentar a oportunidade que você estava esperando.",
            ),
        ],
        call_to_action: Some(CallToAction {
            title: "ACESSAR COMUNIDADE".into(),
            link: "#".into(),
        }),
        community_link: community_link(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BandTone;

    fn id(raw: &str) -> QuizId {
        raw.parse().unwrap()
    }

    #[test]
    fn builtin_has_three_quizzes() {
        let catalog = QuizCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 3);
        for raw in ["quiz-1", "quiz-2", "quiz-3"] {
            let quiz = catalog.lookup(&id(raw)).unwrap();
            assert_eq!(quiz.question_count(), 6);
        }
        assert!(catalog.lookup(&id("quiz-4")).is_none());
    }

    #[test]
    fn top_band_matches_max_achievable_score() {
        let catalog = QuizCatalog::builtin().unwrap();
        for quiz in catalog.iter() {
            let sum_of_max: u32 = quiz.questions().iter().map(Question::max_points).sum();
            let top = quiz.results().iter().map(|b| b.max).max().unwrap();
            assert_eq!(sum_of_max, top, "{}", quiz.id());
            assert_eq!(quiz.max_score(), 18);
        }
    }

    #[test]
    fn builtin_bands_carry_tones_in_order() {
        let catalog = QuizCatalog::builtin().unwrap();
        let quiz = catalog.lookup(&id("quiz-2")).unwrap();
        let tones: Vec<_> = quiz.results().iter().map(ResultBand::tone).collect();
        assert_eq!(tones, [BandTone::Risk, BandTone::Developing, BandTone::Ready]);
    }

    #[test]
    fn from_json_validates_quizzes() {
        let raw = r#"[{
            "id": "mini",
            "title": "Mini",
            "questions": [{
                "id": 1,
                "text": "Q",
                "options": [
                    {"id": "A", "text": "a", "points": 0},
                    {"id": "B", "text": "b", "points": 1},
                    {"id": "C", "text": "c", "points": 2},
                    {"id": "D", "text": "d", "points": 3}
                ]
            }],
            "results": [
                {"min": 0, "max": 1, "status": "low", "description": "", "nextStep": "", "colorVar": "--color-risk", "bgVar": "--color-risk-bg"},
                {"min": 2, "max": 3, "status": "high", "description": "", "nextStep": "", "colorVar": "--color-ready", "bgVar": "--color-ready-bg"}
            ]
        }]"#;
        let catalog = QuizCatalog::from_json(raw).unwrap();
        let quiz = catalog.lookup(&id("mini")).unwrap();
        assert_eq!(quiz.max_score(), 3);
        assert!(quiz.call_to_action().is_none());

        let broken = raw.replace("\"max\": 3", "\"max\": 2");
        assert!(matches!(
            QuizCatalog::from_json(&broken),
            Err(CatalogError::Quiz { .. })
        ));
    }

    #[test]
    fn builtin_menu_locks_later_lessons() {
        let catalog = QuizCatalog::builtin().unwrap();
        let menu = catalog.menu();
        assert_eq!(menu.len(), 3);
        assert_eq!(menu[0].quiz_id, id("quiz-1"));
        assert!(!menu[0].is_locked());
        assert!(menu[1].lock.as_ref().unwrap().message.contains("Aula 2"));
        assert!(menu[2].is_locked());

        for quiz in catalog.iter() {
            assert_eq!(
                quiz.community_link().unwrap().title,
                "ENTRAR NO GRUPO OFICIAL"
            );
        }
    }

    #[test]
    fn from_json_accepts_quizzes_with_menu() {
        let quiz = r#"{
            "id": "mini",
            "title": "Mini",
            "questions": [{
                "id": 1,
                "text": "Q",
                "options": [
                    {"id": "A", "text": "a", "points": 0},
                    {"id": "B", "text": "b", "points": 0},
                    {"id": "C", "text": "c", "points": 0},
                    {"id": "D", "text": "d", "points": 1}
                ]
            }],
            "results": [
                {"min": 0, "max": 1, "status": "ok", "description": "", "nextStep": "", "colorVar": "--color-ready", "bgVar": "--color-ready-bg"}
            ]
        }"#;
        let raw = format!(
            r#"{{"quizzes": [{quiz}], "menu": [
                {{"step": 2, "quizId": "mini", "title": "Later", "lock": {{"note": "soon", "message": "locked"}}}},
                {{"step": 1, "quizId": "mini", "title": "First"}}
            ]}}"#
        );
        let catalog = QuizCatalog::from_json(&raw).unwrap();
        let titles: Vec<_> = catalog.menu().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["First", "Later"]);

        let unknown = raw.replace(r#""quizId": "mini", "title": "First""#, r#""quizId": "other", "title": "First""#);
        assert!(matches!(
            QuizCatalog::from_json(&unknown),
            Err(CatalogError::UnknownMenuQuiz { step: 1, .. })
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = QuizCatalog::from_drafts([quiz_one().unwrap(), quiz_one().unwrap()]).unwrap_err();
        assert!(matches!(err, CatalogError::Duplicate(_)));
    }
}
