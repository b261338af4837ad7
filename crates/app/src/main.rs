use std::fmt;

use log::info;
use remote::{ApiConfig, DataAccess};
use services::{Clock, GenerationWorkflow, ProgressSync, QuizLoopService};
use studyflow_core::model::{AnswerId, CourseId, GenerationDraft, MaterialId, QuestionId, QuizId};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArg(&'static str),
    UnknownArg(String),
    InvalidId { flag: &'static str, raw: String },
    InvalidAnswer { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArg(name) => write!(f, "missing required {name}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidId { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidAnswer { raw } => {
                write!(f, "invalid --answer value: {raw} (expected <question>=<answer>)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_id<T: std::str::FromStr>(flag: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.parse::<T>()
        .map_err(|_| ArgsError::InvalidId { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app generate --course <id> --topic <text> [--difficulty <level>] [--preferences <text>]");
    eprintln!("  app quiz <quiz-id> --answer <question>=<answer> [--answer ...]");
    eprintln!("  app complete <material-id>");
    eprintln!();
    eprintln!("Common options:");
    eprintln!("  --api-url <url>   overrides STUDYFLOW_API_URL");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STUDYFLOW_API_URL, STUDYFLOW_API_TOKEN, STUDYFLOW_API_TIMEOUT_SECS, RUST_LOG");
}

enum Command {
    Generate(GenerationDraft),
    Quiz {
        quiz_id: QuizId,
        answers: Vec<(QuestionId, AnswerId)>,
    },
    Complete(MaterialId),
}

struct Args {
    command: Command,
    config: ApiConfig,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let Some(subcommand) = args.next() else {
            return Ok(None);
        };
        let mut config = ApiConfig::from_env();
        let mut positional: Option<String> = None;
        let mut draft = GenerationDraft::default();
        let mut answers = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api-url" => config = config.with_base_url(require_value(&mut args, "--api-url")?),
                "--course" => {
                    let raw = require_value(&mut args, "--course")?;
                    draft.course_id = Some(parse_id::<CourseId>("--course", raw)?);
                }
                "--topic" => draft.topic = require_value(&mut args, "--topic")?,
                "--difficulty" => draft.difficulty_level = require_value(&mut args, "--difficulty")?,
                "--preferences" => draft.preferences = require_value(&mut args, "--preferences")?,
                "--answer" => {
                    let raw = require_value(&mut args, "--answer")?;
                    answers.push(parse_answer(raw)?);
                }
                "--help" | "-h" => return Ok(None),
                _ if !arg.starts_with("--") && positional.is_none() => positional = Some(arg),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = match subcommand.as_str() {
            "generate" => Command::Generate(draft),
            "quiz" => Command::Quiz {
                quiz_id: parse_id("quiz id", positional.ok_or(ArgsError::MissingArg("quiz id"))?)?,
                answers,
            },
            "complete" => Command::Complete(parse_id(
                "material id",
                positional.ok_or(ArgsError::MissingArg("material id"))?,
            )?),
            "--help" | "-h" => return Ok(None),
            _ => return Err(ArgsError::UnknownArg(subcommand)),
        };

        Ok(Some(Self { command, config }))
    }
}

fn parse_answer(raw: String) -> Result<(QuestionId, AnswerId), ArgsError> {
    let parsed: Option<(QuestionId, AnswerId)> = raw
        .split_once('=')
        .and_then(|(q, a)| Some((q.parse().ok()?, a.parse().ok()?)));
    parsed.ok_or(ArgsError::InvalidAnswer { raw })
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let Some(Args { command, config }) = parsed else {
        print_usage();
        return Ok(());
    };

    info!("using content service at {}", config.base_url);
    let access = DataAccess::http(config)?;

    match command {
        Command::Generate(draft) => {
            let workflow = GenerationWorkflow::new(access.generator, access.materials);
            let save = workflow.submit(draft).await?;
            println!("Generated: {}", save.material().title);
            println!("{}", save.material().content);
            let material = save.outcome().await?;
            println!("Saved material {} ({})", material.id, material.title);
        }
        Command::Quiz { quiz_id, answers } => {
            let loop_svc = QuizLoopService::new(
                Clock::default(),
                access.quizzes,
                ProgressSync::new(access.progress),
            );
            let mut session = loop_svc.load(quiz_id).await?;
            println!("{} ({} questions)", session.title(), session.question_count());
            for (question, answer) in answers {
                session.select_answer(question, answer)?;
            }
            let result = loop_svc.submit(&mut session).await?;
            println!("Your score: {:.1}%", result.score);
            for review in &result.questions {
                let mark = if review.is_correct { "correct" } else { "incorrect" };
                println!("- {} [{mark}]", review.question_text);
                if !review.is_correct
                    && let Some(correct) = &review.correct_text
                {
                    println!("  correct answer: {correct}");
                }
                if let Some(explanation) = &review.explanation {
                    println!("  explanation: {explanation}");
                }
            }
        }
        Command::Complete(material_id) => {
            ProgressSync::new(access.progress)
                .mark_material_complete(material_id)
                .await?;
            println!("Material {material_id} marked as complete");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> impl Iterator<Item = String> {
        raw.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_generate_flags_into_draft() {
        let parsed = Args::parse(args(&[
            "generate",
            "--course",
            "4",
            "--topic",
            "Macros",
            "--difficulty",
            "beginner",
        ]))
        .unwrap()
        .unwrap();

        let Command::Generate(draft) = parsed.command else {
            panic!("expected generate");
        };
        let request = draft.validate().unwrap();
        assert_eq!(request.course_id(), CourseId::new(4));
        assert_eq!(request.topic(), "Macros");
    }

    #[test]
    fn parses_quiz_answers() {
        let parsed = Args::parse(args(&["quiz", "7", "--answer", "1=11", "--answer", "2=21"]))
            .unwrap()
            .unwrap();
        let Command::Quiz { quiz_id, answers } = parsed.command else {
            panic!("expected quiz");
        };
        assert_eq!(quiz_id, QuizId::new(7));
        assert_eq!(
            answers,
            vec![
                (QuestionId::new(1), AnswerId::new(11)),
                (QuestionId::new(2), AnswerId::new(21))
            ]
        );
    }

    #[test]
    fn rejects_malformed_answer() {
        let err = Args::parse(args(&["quiz", "7", "--answer", "1-11"]))
            .err()
            .unwrap();
        assert!(matches!(err, ArgsError::InvalidAnswer { .. }));
    }

    #[test]
    fn api_url_flag_overrides_config() {
        let parsed = Args::parse(args(&["complete", "3", "--api-url", "http://svc/api"]))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.config.base_url, "http://svc/api");
        assert!(matches!(parsed.command, Command::Complete(id) if id == MaterialId::new(3)));
    }

    #[test]
    fn no_arguments_prints_usage() {
        assert!(Args::parse(args(&[])).unwrap().is_none());
    }
}
