use crate::cache::{CURRENT_RECORD_KEY, ResearchContext};
use crate::logger::AUDIT_TARGET;
use crate::delivery::DirectoryDelivery;
use crate::errors::ExportError;
use crate::export::RenderOptions;
use crate::exporter::Exporter;
use crate::record::CompoundData;
use crate::session::LoadApplied;
use crate::source::{LoadContext, SourceKind, SourceRegistry, resolve};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use super::command::Command;
use super::util::{parse_export_format, parse_source, session_for};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    Human,
    Plain,
    Json,
}

/// What every command runs against.
#[derive(Clone)]
pub struct CliContext {
    pub registry: SourceRegistry,
    pub opts: RenderOptions,
    pub output_dir: PathBuf,
    /// Principal used when a command does not name one.
    pub default_user: Option<String>,
}

pub async fn run(ctx: &CliContext, cmd: Command) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with_format(ctx, cmd, OutputMode::Human, &mut out).await
}

pub async fn run_with_format(
    ctx: &CliContext,
    cmd: Command,
    mode: OutputMode,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Command::Sources => {
            match mode {
                OutputMode::Json => {
                    let list: Vec<_> = SourceKind::ALL
                        .iter()
                        .map(|k| {
                            serde_json::json!({
                                "slug": k.slug(),
                                "label": k.label(),
                                "fields": resolve(*k).schema.len(),
                            })
                        })
                        .collect();
                    writeln!(out, "{}", serde_json::Value::Array(list))?;
                }
                OutputMode::Plain => {
                    for k in SourceKind::ALL {
                        writeln!(out, "{}", k.slug())?;
                    }
                }
                OutputMode::Human => {
                    for k in SourceKind::ALL {
                        let fields = resolve(k).schema.len();
                        writeln!(out, "{} label={} fields={fields}", k.slug(), k.label())?;
                    }
                }
            }
            Ok(())
        }
        Command::Fields { source } => {
            let kind = parse_source(&source)?;
            let d = resolve(kind);
            match mode {
                OutputMode::Json => {
                    let list: Vec<_> = d
                        .schema
                        .iter()
                        .map(|f| serde_json::json!({"key": f.key, "label": f.label}))
                        .collect();
                    writeln!(out, "{}", serde_json::Value::Array(list))?;
                }
                OutputMode::Plain => {
                    for f in d.schema {
                        writeln!(out, "{}", f.key)?;
                    }
                }
                OutputMode::Human => {
                    for f in d.schema {
                        writeln!(out, "{} label={:?}", f.key, f.label)?;
                    }
                }
            }
            Ok(())
        }
        Command::Preview { source, format, fields, user } => {
            let ex = prepare(ctx, &source, &format, fields.as_deref(), user.as_deref(), None)
                .await?;
            let state = ex
                .state()
                .ok_or_else(|| ExportError::PreviewBlocked("no source selected".into()))?;
            let text = state.preview_text();
            match mode {
                OutputMode::Json => {
                    let json = serde_json::json!({
                        "source": state.kind().slug(),
                        "format": state.format().to_string(),
                        "from_cache": state.from_cache(),
                        "info": state.info_message(),
                        "error": state.error_message(),
                        "preview": text,
                    });
                    writeln!(out, "{json}")?;
                }
                OutputMode::Plain => write!(out, "{text}")?,
                OutputMode::Human => {
                    if let Some(info) = state.info_message() {
                        writeln!(out, "# {info}")?;
                    }
                    if let Some(err) = state.error_message() {
                        writeln!(out, "# {err}")?;
                    }
                    write!(out, "{text}")?;
                }
            }
            Ok(())
        }
        Command::Export { source, format, fields, user, out_dir } => {
            let ex = prepare(ctx, &source, &format, fields.as_deref(), user.as_deref(), out_dir)
                .await?;
            let report = ex.download()?;
            let path = report
                .location
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            match mode {
                OutputMode::Json => {
                    let json = serde_json::json!({
                        "action": "exported",
                        "path": path,
                        "bytes": report.bytes,
                    });
                    writeln!(out, "{json}")?;
                }
                OutputMode::Plain => writeln!(out, "{path}")?,
                OutputMode::Human => writeln!(out, "exported path={path} bytes={}", report.bytes)?,
            }
            Ok(())
        }
        Command::CacheShow => {
            let cache = ctx.registry.cache();
            let record = cache.read(CURRENT_RECORD_KEY)?;
            match mode {
                OutputMode::Json => {
                    let json = serde_json::json!({
                        "record": record,
                        "metrics": cache.metrics_snapshot(),
                    });
                    writeln!(out, "{json}")?;
                }
                OutputMode::Plain => match &record {
                    Some(r) => writeln!(out, "{}", r.display_identifier())?,
                    None => writeln!(out, "none")?,
                },
                OutputMode::Human => match &record {
                    Some(r) => writeln!(out, "{}", serde_json::to_string_pretty(r)?)?,
                    None => writeln!(out, "no cached record")?,
                },
            }
            Ok(())
        }
        Command::CacheSet { json } => {
            let record: CompoundData = serde_json::from_str(&json)?;
            let id = record.display_identifier().to_string();
            ResearchContext::new(Arc::clone(ctx.registry.cache())).set(Some(record))?;
            log::info!(target: AUDIT_TARGET, "cache set key={CURRENT_RECORD_KEY} record={id}");
            match mode {
                OutputMode::Json => {
                    let json = serde_json::json!({"action": "cached", "record": id});
                    writeln!(out, "{json}")?;
                }
                OutputMode::Plain => writeln!(out, "{id}")?,
                OutputMode::Human => writeln!(out, "cached record={id}")?,
            }
            Ok(())
        }
        Command::CacheClear => {
            ResearchContext::new(Arc::clone(ctx.registry.cache())).set(None)?;
            log::info!(target: AUDIT_TARGET, "cache cleared key={CURRENT_RECORD_KEY}");
            match mode {
                OutputMode::Json => {
                    writeln!(out, "{}", serde_json::json!({"action": "cleared"}))?;
                }
                OutputMode::Plain => writeln!(out, "cleared")?,
                OutputMode::Human => writeln!(out, "cleared key={CURRENT_RECORD_KEY}")?,
            }
            Ok(())
        }
    }
}

/// Select, load, narrow the fields, pick the format and render the preview.
async fn prepare(
    ctx: &CliContext,
    source: &str,
    format: &Option<String>,
    fields: Option<&[String]>,
    user: Option<&str>,
    out_dir: Option<PathBuf>,
) -> Result<Exporter, ExportError> {
    let kind = parse_source(source)?;
    let format = parse_export_format(format)?;
    let dir = out_dir.unwrap_or_else(|| ctx.output_dir.clone());
    let delivery = Arc::new(DirectoryDelivery::new(dir));
    let mut ex = Exporter::new(ctx.registry.clone(), ctx.opts.clone(), delivery);
    ex.set_format(format);
    let session = session_for(user.or(ctx.default_user.as_deref()));
    let load_ctx = LoadContext::default().with_session(session);
    if ex.select_source(kind, &load_ctx).await == LoadApplied::Pending {
        return Err(ExportError::PreviewBlocked("records are still loading".into()));
    }
    if let Some(fields) = fields {
        let d = resolve(kind);
        if let Some(bad) = fields.iter().find(|k| d.field(k).is_none()) {
            return Err(ExportError::UnknownField {
                kind: kind.slug().to_string(),
                key: bad.clone(),
            });
        }
        let keys: Vec<&str> = fields.iter().map(String::as_str).collect();
        ex.select_only(&keys);
    }
    if ex.state().and_then(|s| s.error_message()).is_none() {
        ex.preview()?;
    }
    Ok(ex)
}
