//! Interactive quiz session
//!
//! Reads one answer per line:
//! - `3`, `3!` select answer 3 and are sure; `3~` selects it with a doubt
//! - `?` for "don't know"
//! - `q` suspends the session and writes the state blob

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use kioku_core::{Certainty, HistoryEntry, ItemContents, ItemStore, LearningItem, Phase, QuizEngine};
use rand::Rng;

/// One parsed line of user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Zero-based answer position
    Select { position: usize, certainty: Certainty },
    DontKnow,
    Suspend,
}

/// Parse an input line against an answer set of `answer_count` entries
pub fn parse_input(line: &str, answer_count: usize) -> Result<Input, String> {
    let line = line.trim();
    match line {
        "q" | "quit" => return Ok(Input::Suspend),
        "?" => return Ok(Input::DontKnow),
        _ => {}
    }

    let (digits, certainty) = if let Some(rest) = line.strip_suffix('~') {
        (rest, Certainty::Maybe)
    } else if let Some(rest) = line.strip_suffix('!') {
        (rest, Certainty::Sure)
    } else {
        (line, Certainty::Sure)
    };

    let number: usize = digits
        .trim()
        .parse()
        .map_err(|_| format!("expected 1-{}, '?' or 'q', got '{}'", answer_count, line))?;
    if number == 0 || number > answer_count {
        return Err(format!("answer must be between 1 and {}", answer_count));
    }

    Ok(Input::Select {
        position: number - 1,
        certainty,
    })
}

/// Text shown for an item as an answer choice
pub fn answer_text(item: &LearningItem) -> String {
    match &item.contents {
        ItemContents::Kana { romaji, .. } => romaji.clone(),
        ItemContents::Kanji {
            meanings,
            on_readings,
            kun_readings,
            ..
        } => {
            if !meanings.is_empty() {
                meanings.join(", ")
            } else {
                on_readings
                    .iter()
                    .chain(kun_readings)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join("・")
            }
        }
        ItemContents::Word { kana, meaning, .. } => format!("{} ({})", kana, meaning),
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State written to the resume file
    Suspended,
    /// Input closed
    Finished,
}

/// Run the question/answer loop until the user suspends or input ends
pub fn run<S, R, I, O>(
    engine: &mut QuizEngine<S, R>,
    input: &mut I,
    output: &mut O,
    state_path: &Path,
) -> anyhow::Result<Outcome>
where
    S: ItemStore,
    R: Rng,
    I: BufRead,
    O: Write,
{
    // A resumed session shows its pending question again
    if engine.phase() != Phase::QuestionShown {
        engine.prepare_new_question()?;
    }

    loop {
        show_question(engine, output)?;

        let input_line = loop {
            write!(output, "{} ", ">".bold())?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                print_summary(engine, output)?;
                return Ok(Outcome::Finished);
            }
            match parse_input(&line, engine.current_answers().len()) {
                Ok(parsed) => break parsed,
                Err(message) => writeln!(output, "{}", message.yellow())?,
            }
        };

        let entry = match input_line {
            Input::Suspend => {
                std::fs::write(state_path, engine.save_state())
                    .with_context(|| format!("writing session state to {}", state_path.display()))?;
                writeln!(output, "Session saved to {}", state_path.display())?;
                print_summary(engine, output)?;
                return Ok(Outcome::Suspended);
            }
            Input::DontKnow => engine.select_answer(Certainty::DontKnow, None, &mut ())?,
            Input::Select {
                position,
                certainty,
            } => engine.select_answer(certainty, Some(position), &mut ())?,
        };

        show_feedback(engine, entry, output)?;
        engine.prepare_new_question()?;
    }
}

fn show_question<S: ItemStore, R: Rng, O: Write>(
    engine: &QuizEngine<S, R>,
    output: &mut O,
) -> anyhow::Result<()> {
    let Some(question) = engine.current_question() else {
        return Ok(());
    };

    writeln!(output)?;
    writeln!(
        output,
        "{} {}",
        format!("[{}]", engine.question_count() + 1).dimmed(),
        question.contents.key_text().cyan().bold()
    )?;
    for (index, answer) in engine.current_answers().iter().enumerate() {
        writeln!(output, "  {}. {}", index + 1, engine.render(answer))?;
    }
    Ok(())
}

fn show_feedback<S: ItemStore, R: Rng, O: Write>(
    engine: &QuizEngine<S, R>,
    entry: HistoryEntry,
    output: &mut O,
) -> anyhow::Result<()> {
    let expected = engine
        .current_question()
        .map(|q| engine.render(q))
        .unwrap_or_default();

    match entry {
        HistoryEntry::Correct { .. } => writeln!(output, "{}", "Correct".green().bold())?,
        HistoryEntry::Unknown { .. } => {
            writeln!(output, "{} {}", "Answer:".yellow(), expected)?
        }
        HistoryEntry::Incorrect { .. } => {
            writeln!(output, "{} {} {}", "Wrong.".red().bold(), "Answer:".yellow(), expected)?
        }
    }
    Ok(())
}

fn print_summary<S: ItemStore, R: Rng, O: Write>(
    engine: &QuizEngine<S, R>,
    output: &mut O,
) -> anyhow::Result<()> {
    writeln!(output)?;
    writeln!(
        output,
        "{}: {}/{}",
        "Correct answers".white().bold(),
        engine.correct_count(),
        engine.question_count()
    )?;
    Ok(())
}
