use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};
use soapnote_codec::clipboard::format_procedure;
use soapnote_codec::procedure::sectionize;
use soapnote_codec::{
    format_for_clipboard, parse_document, parse_document_with_report, serialize_with_config,
    DirectoryStore, DocumentStore, EditSession,
};
use soapnote_core::{ClinicalDocument, CodecConfig, EncounterMeta};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "soapnote-cli",
    about = "Đọc, chuẩn hóa và kiểm tra ghi chú khám dạng văn bản thô."
)]
struct Args {
    /// Số khoảng trắng thụt lề cho khối JSON khi ghi lại.
    #[arg(long, global = true)]
    indent: Option<usize>,

    /// Ghi log chi tiết (debug).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tách ghi chú thô thành JSON có cấu trúc.
    Parse {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Ghi tài liệu JSON trở lại văn bản thô.
    Serialize {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Tách rồi ghi lại, kiểm tra lần tách thứ hai cho cùng kết quả.
    Roundtrip {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Xuất một mục ở dạng văn bản để sao chép.
    Clipboard {
        #[arg(short, long)]
        input: PathBuf,
        /// "Subjective", "Objective", "Assessment & Plan", "Procedure" hoặc "Orders".
        #[arg(short, long)]
        section: String,
        /// Giờ bắt đầu buổi khám (RFC 3339), điền vào "Insert date/time".
        #[arg(long, requires = "end")]
        start: Option<DateTime<FixedOffset>>,
        /// Giờ kết thúc buổi khám (RFC 3339).
        #[arg(long, requires = "start")]
        end: Option<DateTime<FixedOffset>>,
    },
    /// Đọc từ kho thư mục, chuẩn hóa và lưu đè.
    Normalize {
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        id: String,
        /// Vẫn lưu khi có khối dữ liệu nhúng bị thay bằng giá trị mặc định.
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let mut config = CodecConfig::default();
    if let Some(indent) = args.indent {
        config.indent = indent;
    }

    match args.command {
        Command::Parse { input } => {
            let report = parse_document_with_report(&read_input(&input)?);
            for diagnostic in &report.diagnostics {
                tracing::warn!(field = %diagnostic.field, "{}", diagnostic.reason);
            }
            println!("{}", serde_json::to_string_pretty(&report.document)?);
        }
        Command::Serialize { input } => {
            let mut document: ClinicalDocument = serde_json::from_str(&read_input(&input)?)
                .with_context(|| format!("Tài liệu JSON không hợp lệ: {:?}", input))?;
            document.procedure = sectionize(&document.procedure_text);
            println!("{}", serialize_with_config(&document, &config)?);
        }
        Command::Roundtrip { input } => {
            let first = parse_document(&read_input(&input)?);
            let raw = serialize_with_config(&first, &config)?;
            let second = parse_document(&raw);
            println!("{raw}");
            if first == second {
                eprintln!("Round trip: stable");
            } else {
                eprintln!("Round trip: fields changed after re-parse");
            }
        }
        Command::Clipboard {
            input,
            section,
            start,
            end,
        } => {
            let document = parse_document(&read_input(&input)?);
            let text = match section.as_str() {
                "Subjective" => format_for_clipboard(
                    &section,
                    &serde_json::to_value(&document.soap.subjective)?,
                ),
                "Objective" => format_for_clipboard(
                    &section,
                    &serde_json::Value::Object(document.soap.objective.clone()),
                ),
                "Assessment & Plan" => format_for_clipboard(
                    &section,
                    &serde_json::to_value(&document.soap.assessment_and_plan)?,
                ),
                "Procedure" => {
                    let meta = start
                        .zip(end)
                        .map(|(start, end)| EncounterMeta::from_times(start, end));
                    format_procedure(&document.procedure, meta.as_ref())
                }
                _ => format_for_clipboard(&section, &serde_json::to_value(&document.orders)?),
            };
            println!("{text}");
        }
        Command::Normalize { store, id, force } => {
            let mut store = DirectoryStore::new(store);
            let (session, raw) = normalize(&mut store, &id, &config, force)?;
            println!(
                "Saved {}: {} bytes, {} defaulted field(s)",
                session.id(),
                raw.len(),
                session.diagnostics().len()
            );
        }
    }

    Ok(())
}

/// Re-save a stored note in canonical form. Refuses when a block would be
/// replaced by its default, unless `force` is set.
fn normalize<S>(
    store: &mut S,
    id: &str,
    config: &CodecConfig,
    force: bool,
) -> anyhow::Result<(EditSession, String)>
where
    S: DocumentStore,
{
    let session = EditSession::open(&*store, id, None)
        .with_context(|| format!("Không mở được ghi chú {id}"))?;

    if !force && !session.diagnostics().is_empty() {
        let fields: Vec<_> = session
            .diagnostics()
            .iter()
            .map(|diagnostic| diagnostic.field.as_str())
            .collect();
        bail!(
            "Ghi chú {id} có khối không đọc được ({}); dùng --force để vẫn lưu",
            fields.join(", ")
        );
    }

    let raw = session.commit(store, config)?;
    Ok((session, raw))
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::registry()
        .with(log_filter(rust_log.as_deref(), verbose))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

/// `RUST_LOG` wins when it parses; otherwise the codec logs at info (debug with `-v`).
fn log_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    let directive = if verbose {
        "soapnote_codec=debug"
    } else {
        "soapnote_codec=info"
    };
    rust_log
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(directive))
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Không đọc được file {:?}", path))
}
