//! Pre-transfer confirmation prompts.

use gcache_core::plan::{ConfirmTransfer, TransferSummary};
use std::io::{self, BufRead, Write};

fn mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

/// Interactive y/N prompt on stdin.
pub struct PromptConfirm;

impl ConfirmTransfer for PromptConfirm {
    fn confirm_transfer(&self, summary: &TransferSummary) -> bool {
        if summary.blocked {
            eprintln!("Some required files are missing or corrupted and have no download source:");
            for line in &summary.lines {
                eprintln!("  {line}");
            }
            return false;
        }

        println!("The local game cache is outdated and needs to be updated.");
        println!(
            "This will copy {:.2} MB from the local disk and download {:.2} MB from the internet.",
            mb(summary.local_bytes),
            mb(summary.remote_bytes)
        );
        for line in &summary.lines {
            println!("  {line}");
        }
        print!("Continue? [y/N] ");
        let _ = io::stdout().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}

/// Non-interactive confirmation for `--yes`; still refuses blocked plans.
pub struct AlwaysConfirm;

impl ConfirmTransfer for AlwaysConfirm {
    fn confirm_transfer(&self, summary: &TransferSummary) -> bool {
        !summary.blocked
    }
}
