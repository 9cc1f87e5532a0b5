//! Line-based presentation: renders a `SessionSnapshot` and turns input lines
//! into session calls.

use std::io::{self, Write};

use funnel_core::model::{IdentityDraft, OptionId};
use services::{QuizSession, QuizStep, SessionError, SessionSnapshot};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Continue,
    Choose(OptionId),
    Pick(u32),
    Restart,
    Quit,
    Unknown(String),
}

impl Command {
    pub(crate) fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => Self::Continue,
            "q" | "sair" => Self::Quit,
            "r" | "refazer" => Self::Restart,
            _ => {
                if let Ok(step) = trimmed.parse::<u32>() {
                    return Self::Pick(step);
                }
                trimmed
                    .parse::<OptionId>()
                    .map_or_else(|_| Self::Unknown(trimmed.to_string()), Self::Choose)
            }
        }
    }
}

pub(crate) fn render(snapshot: &SessionSnapshot) -> String {
    if !snapshot.loaded {
        return "Carregando quiz...\n".to_string();
    }

    let mut lines = Vec::new();
    if let Some(title) = &snapshot.title {
        lines.push(String::new());
        lines.push(format!("== {title} =="));
    }

    match snapshot.step {
        QuizStep::Intro => {
            if let Some(subtitle) = &snapshot.subtitle {
                lines.push(subtitle.clone());
            }
            match &snapshot.identity_name {
                Some(name) => lines.push(format!("Bem-vindo(a) de volta, {name}. [Enter] continua.")),
                None => lines.push("Informe seu nome e WhatsApp para liberar o diagnóstico.".into()),
            }
        }
        QuizStep::Menu => {
            if let Some(name) = &snapshot.identity_name {
                lines.push(format!("Olá, {name}!"));
            }
            lines.push("Diagnóstico Liberado".into());
            if snapshot.menu.is_empty() {
                lines.push("[Enter] começa, [q] sai.".into());
            } else {
                lines.push("Complete o Passo 1 para desbloquear os próximos.".into());
                for entry in &snapshot.menu {
                    let status = if entry.is_locked() { "Bloqueado" } else { "Disponível" };
                    lines.push(format!("  [{}] Passo {:02} • {status}: {}", entry.step, entry.step, entry.title));
                    match &entry.lock {
                        Some(lock) => lines.push(format!("      {}", lock.note)),
                        None if !entry.teaser.is_empty() => lines.push(format!("      {}", entry.teaser)),
                        None => {}
                    }
                }
                lines.push("Escolha um passo ([Enter] começa, [q] sai)".into());
            }
        }
        QuizStep::Question => {
            if let Some(progress) = snapshot.progress {
                lines.push(format!("Pergunta {} de {}", progress.number, progress.total));
            }
            if let Some(question) = &snapshot.question {
                lines.push(question.text.clone());
                for option in &question.options {
                    lines.push(format!("  {}) {}", option.id, option.text));
                }
            }
            lines.push("Escolha A-D ([r] recomeça, [q] sai)".into());
        }
        QuizStep::Result => {
            if let Some(result) = &snapshot.result {
                lines.push(result.band.status.clone());
                lines.push(format!(
                    "Pontuação: {}/{} ({}%)",
                    result.score, result.max_score, result.percentage
                ));
                lines.push(result.band.description.clone());
                lines.push(result.band.next_step.clone());
                for link in [&result.call_to_action, &result.community_link].into_iter().flatten() {
                    lines.push(format!("{} -> {}", link.title, link.link));
                }
            } else {
                lines.push(format!("Pontuação: {}", snapshot.score));
            }
            lines.push("[r] refazer, [q] sair".into());
        }
    }

    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

/// Run the funnel until the user quits or input ends.
///
/// # Errors
///
/// Returns I/O errors from reading input or writing output. Session errors
/// are shown to the user and the loop continues.
pub(crate) async fn drive<R, W>(session: &mut QuizSession, input: R, out: &mut W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        let snapshot = session.snapshot();
        write!(out, "{}", render(&snapshot))?;
        out.flush()?;
        if !snapshot.loaded {
            return Ok(());
        }

        if snapshot.step == QuizStep::Intro && snapshot.identity_name.is_none() {
            let Some(name) = prompt(&mut lines, out, "Nome: ").await? else {
                return Ok(());
            };
            let Some(whatsapp) = prompt(&mut lines, out, "WhatsApp: ").await? else {
                return Ok(());
            };
            let outcome = session
                .submit_identity(IdentityDraft::new(name, whatsapp))
                .await;
            report(out, outcome)?;
            continue;
        }

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        match (snapshot.step, Command::parse(&line)) {
            (_, Command::Quit) => return Ok(()),
            (_, Command::Restart) => {
                session.restart();
            }
            (QuizStep::Question, Command::Choose(option)) => {
                report(out, session.choose_option(option))?;
            }
            (QuizStep::Intro | QuizStep::Menu, Command::Continue) => {
                report(out, session.advance())?;
            }
            (QuizStep::Menu, Command::Pick(step)) => {
                match snapshot.menu.iter().find(|entry| entry.step == step) {
                    Some(entry) => match &entry.lock {
                        Some(lock) => writeln!(out, "{}", lock.message)?,
                        None => report(out, session.advance())?,
                    },
                    None => writeln!(out, "! passo inválido: {step}")?,
                }
            }
            (_, Command::Unknown(raw)) => writeln!(out, "! opção inválida: {raw}")?,
            _ => {}
        }
    }
}

async fn prompt<R, W>(lines: &mut Lines<R>, out: &mut W, label: &str) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{label}")?;
    out.flush()?;
    lines.next_line().await
}

fn report<T, W: Write>(out: &mut W, outcome: Result<T, SessionError>) -> io::Result<()> {
    if let Err(err) = outcome {
        writeln!(out, "! {err}")?;
    }
    Ok(())
}
