//! chat-runner: headless dialogue runner for the assessment core.
//!
//! Plays the messaging dispatcher's role on stdin/stdout so the quiz,
//! the capacity interview and the A-Score can be exercised without a
//! WhatsApp transport.
//!
//! Usage:
//!   chat-runner --seed 42 --phone 628123456789
//!   chat-runner --seed 42 --db profiles.db --data-dir ./data
//!
//! Slash commands start flows (/quiz /capacity /score /stats /sweep
//! /quit); a digit answers the active quiz (1-4); any other text feeds
//! the active capacity interview.

use anyhow::Result;
use ascore_core::capacity_interview::CapacityReply;
use ascore_core::clock::SystemClock;
use ascore_core::config::CoreConfig;
use ascore_core::content::QuestionCatalog;
use ascore_core::engine::AssessmentCore;
use ascore_core::quiz_engine::{QuestionView, QuizNext, QuizReply, QuizStart};
use ascore_core::session_store::SessionKind;
use ascore_core::store::{MemoryProfileStore, ProfileStore, SqliteProfileStore};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let phone = string_arg(&args, "--phone").unwrap_or_else(|| "628000000001".to_string());
    let db = string_arg(&args, "--db");
    let data_dir = string_arg(&args, "--data-dir");

    let profiles: Arc<dyn ProfileStore> = match &db {
        Some(path) => Arc::new(SqliteProfileStore::open(path)?),
        None => Arc::new(MemoryProfileStore::default()),
    };
    let (config, catalog) = match &data_dir {
        Some(dir) => (CoreConfig::load(dir)?, QuestionCatalog::load(dir)?),
        None => (CoreConfig::default(), QuestionCatalog::builtin()?),
    };
    let core = AssessmentCore::new(seed, config, catalog, profiles, Arc::new(SystemClock))?;

    println!("assessment core ready");
    println!("  phone: {phone}");
    println!("  seed:  {seed}");
    println!("  db:    {}", db.as_deref().unwrap_or(":memory:"));
    println!("commands: /quiz /capacity /score /stats /sweep /quit");
    println!();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        match text {
            "/quit" => break,
            "/quiz" => {
                core.record_interaction(&phone, "quiz")?;
                print_quiz_start(core.start_quiz(&phone)?);
            }
            "/capacity" => {
                core.record_interaction(&phone, "check_data")?;
                println!("{}", core.start_capacity(&phone));
            }
            "/score" => {
                core.record_interaction(&phone, "check_data")?;
                print_score(&core, &phone)?;
            }
            "/stats" => {
                let record = core.record_interaction(&phone, "menu")?;
                println!("{}", serde_json::to_string_pretty(&record)?);
                println!("engagement score: {:.1}", core.engagement_score(&record));
            }
            "/sweep" => println!("swept {} idle sessions", core.sweep_sessions()),
            _ => route(&core, &phone, text)?,
        }
        io::stdout().flush()?;
    }
    Ok(())
}

/// The dispatcher's job: hand the message to whichever dialogue is
/// active for this user.
fn route(core: &AssessmentCore, phone: &str, text: &str) -> Result<()> {
    log::debug!("routing inbound message for {phone}");
    match core.active_session(phone) {
        Some(SessionKind::Capacity) => {
            core.record_interaction(phone, "check_data")?;
            print_capacity_reply(core.answer_capacity(phone, text));
        }
        Some(SessionKind::Quiz) => {
            core.record_interaction(phone, "quiz")?;
            match text.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
                Some(index) => print_quiz_reply(core.answer_quiz(phone, index)?),
                None => println!("Jawab dengan nomor pilihan (1-4)."),
            }
        }
        None => {
            core.record_interaction(phone, "other")?;
            println!("Tidak ada sesi aktif. Mulai dengan /quiz atau /capacity.");
        }
    }
    Ok(())
}

fn print_question(question: &QuestionView) {
    println!(
        "Pertanyaan {}/{}: {}",
        question.number, question.of, question.text
    );
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {option}", i + 1);
    }
}

fn print_quiz_start(start: QuizStart) {
    match start {
        QuizStart::Started {
            week,
            title,
            question,
        } => {
            println!("=== Kuis Minggu {week}: {title} ===");
            print_question(&question);
        }
        QuizStart::Resumed { week, question } => {
            println!("Melanjutkan kuis minggu {week}.");
            print_question(&question);
        }
        QuizStart::AllWeeksComplete => {
            println!("Selamat! Semua 15 minggu literasi sudah selesai.");
        }
    }
}

fn print_quiz_reply(reply: QuizReply) {
    match reply {
        QuizReply::NoActiveQuiz => {
            println!("Tidak ada kuis aktif. Ketik /quiz untuk mulai.");
        }
        QuizReply::Answered {
            correct,
            correct_option,
            explanation,
            correct_count,
            total_asked,
            next,
        } => {
            if correct {
                println!("Benar! {explanation}");
            } else {
                println!("Belum tepat. Jawaban: {correct_option}. {explanation}");
            }
            println!("Skor sementara: {correct_count}/{total_asked}");
            match next {
                QuizNext::Question(question) => print_question(&question),
                QuizNext::Completed { week, score, passed } => {
                    let verdict = if passed { "LULUS" } else { "BELUM LULUS" };
                    println!("Kuis minggu {week} selesai: nilai {score} — {verdict}");
                }
            }
        }
    }
}

fn print_capacity_reply(reply: CapacityReply) {
    match reply {
        CapacityReply::NoActiveInterview => {
            println!("Tidak ada wawancara aktif. Ketik /capacity untuk mulai.");
        }
        CapacityReply::Retry { prompt, .. } => println!("{prompt}"),
        CapacityReply::Next { prompt, .. } => println!("{prompt}"),
        CapacityReply::Completed { data, rpc } => {
            println!("=== Hasil Analisis Kapasitas ===");
            for (field, value) in &data {
                println!("  {field}: {value:.0}");
            }
            println!("  pendapatan/bulan: {:.0}", rpc.monthly_income);
            println!("  pengeluaran/bulan: {:.0}", rpc.monthly_expenses);
            println!("  sisa kas: {:.0}", rpc.sustainable_disposable_cash);
            println!("  cicilan maksimal: {:.0}", rpc.max_installment);
            println!("  skor kapasitas: {}", rpc.capacity_score);
        }
    }
}

fn print_score(core: &AssessmentCore, phone: &str) -> Result<()> {
    let ascore = core.ascore_for(phone, None, None)?;
    println!("=== A-SCORE ===");
    println!("  skor: {}", ascore.score);
    println!("  zona: {:?}", ascore.zone);
    println!("  rekomendasi: {}", ascore.recommendation);
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg(args: &[String], flag: &str) -> Option<String> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].clone())
}
