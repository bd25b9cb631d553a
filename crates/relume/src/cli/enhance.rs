//! The `relume enhance` command: fetch, enhance, and save images.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use relume_core::{Config, EnhanceOutcome, EnhancedImage, Enhancer, Priority};

/// Arguments for the `enhance` command.
#[derive(Args, Debug)]
pub struct EnhanceArgs {
    /// Image URLs to enhance. The first runs at high priority (the primary
    /// product photo), the rest at normal.
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Force one priority for every URL (high, normal, low)
    #[arg(short, long)]
    pub priority: Option<Priority>,

    /// Write enhanced output to this file (one URL) or directory (batch)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write enhanced output into the configured output directory
    #[arg(long)]
    pub save: bool,

    /// Print one JSON record per result on stdout
    #[arg(long)]
    pub json: bool,

    /// Print data URLs instead of summaries
    #[arg(long)]
    pub data_url: bool,
}

/// Execute the enhance command.
pub async fn execute(args: EnhanceArgs, config: Config) -> anyhow::Result<()> {
    let output_dir = config.output_dir();
    let enhancer = Enhancer::new(config)?;

    let progress = if args.urls.len() > 1 && !args.json && !args.data_url {
        let bar = ProgressBar::new(args.urls.len() as u64);
        bar.set_style(ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} {msg}",
        )?);
        Some(bar)
    } else {
        None
    };

    let mut failures = 0usize;
    for (index, url) in args.urls.iter().enumerate() {
        let priority = args.priority.unwrap_or(if index == 0 {
            Priority::High
        } else {
            Priority::Normal
        });
        if let Some(bar) = &progress {
            bar.set_message(url.clone());
        }

        match enhancer.enhance(url, priority).await {
            Ok(EnhanceOutcome::Enhanced(image)) => {
                if let Some(path) = target_path(&args, index, &output_dir, &image)? {
                    std::fs::write(&path, &image.bytes)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("Wrote {} ({} bytes)", path.display(), image.encoded_size);
                }
                report_enhanced(&args, &image)?;
            }
            Ok(EnhanceOutcome::Degraded { source_url, reason }) => {
                tracing::warn!("Could not enhance {source_url}: {reason}");
                report_degraded(&args, &source_url, &reason)?;
            }
            Err(e) => {
                tracing::error!("Enhancement failed for {url}: {e}");
                failures += 1;
            }
        }

        if let Some(bar) = &progress {
            bar.inc(1);
        }
    }

    if let Some(bar) = &progress {
        bar.finish_and_clear();
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} images failed", args.urls.len());
    }
    Ok(())
}

/// Where to write this result, if anywhere.
///
/// `--output` beats `--save`; with multiple URLs, `--output` names a
/// directory and files are named by content hash.
fn target_path(
    args: &EnhanceArgs,
    index: usize,
    output_dir: &Path,
    image: &EnhancedImage,
) -> anyhow::Result<Option<PathBuf>> {
    if let Some(raw) = &args.output {
        let expanded = PathBuf::from(shellexpand::tilde(raw).into_owned());
        if args.urls.len() == 1 {
            if index == 0 {
                if let Some(parent) = expanded.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                return Ok(Some(expanded));
            }
            return Ok(None);
        }
        std::fs::create_dir_all(&expanded)?;
        return Ok(Some(expanded.join(file_name_for(image))));
    }

    if args.save {
        std::fs::create_dir_all(output_dir)?;
        return Ok(Some(output_dir.join(file_name_for(image))));
    }

    Ok(None)
}

/// Content-addressed file name for a batch result.
fn file_name_for(image: &EnhancedImage) -> String {
    format!("{}.jpg", &image.content_hash[..16.min(image.content_hash.len())])
}

fn report_enhanced(args: &EnhanceArgs, image: &EnhancedImage) -> anyhow::Result<()> {
    if args.json {
        println!("{}", serde_json::to_string(image)?);
    } else if args.data_url {
        println!("{}", image.to_data_url());
    } else {
        println!(
            "{} -> {}x{} jpeg, {} bytes in {}ms",
            image.source_url, image.width, image.height, image.encoded_size, image.elapsed_ms
        );
    }
    Ok(())
}

fn report_degraded(args: &EnhanceArgs, source_url: &str, reason: &str) -> anyhow::Result<()> {
    if args.json {
        let record = serde_json::json!({
            "source_url": source_url,
            "degraded": true,
            "reason": reason,
        });
        println!("{record}");
    } else if args.data_url {
        // Degraded results have no encoded bytes; the original URL is the handle.
        println!("{source_url}");
    } else {
        println!("{source_url} -> degraded, serving original ({reason})");
    }
    Ok(())
}
