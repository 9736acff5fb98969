//! Interactive candidate confirmation.
//!
//! Shows each candidate pair with a colorized name diff and asks the user
//! whether the two files are the same recording. Answers map to:
//! `y` - accept (the newer file becomes a deletion target), `n` - reject
//! (the pair is remembered in the skip cache), `q` - stop asking without
//! marking the remaining pairs either way.

use std::io::{self, Write};

use bytesize::ByteSize;
use similar::DiffTag;
use yansi::Paint;

use crate::compare::{CandidatePair, NameAlignment};
use crate::scanner::is_noise_char;

/// Size difference above which the confirmation display warns loudly.
pub const SIZE_WARN_BYTES: u64 = 200 * 1024 * 1024;

/// The user's verdict on one candidate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Same file: queue the newer one for deletion.
    Accept,
    /// Different files: remember the pair so it is not asked again.
    Reject,
    /// Stop early; remaining pairs stay unmarked.
    Quit,
}

/// Source of confirmation verdicts.
///
/// The engine drives this once per candidate pair, in order. Implemented
/// by the stdin prompt in production and by scripted answers in tests.
pub trait Confirmer {
    /// Ask about one pair; `index` is 1-based within `total` questions.
    fn confirm(&mut self, pair: &CandidatePair, index: usize, total: usize) -> io::Result<Verdict>;
}

/// Interactive stdin-backed confirmer.
pub struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn confirm(&mut self, pair: &CandidatePair, index: usize, total: usize) -> io::Result<Verdict> {
        print_candidate(pair, index, total);

        print!("{} ", "Same recording? (newer is deleted) [y/n/q]:".cyan());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF behaves like quit so piped input cannot hang the loop
            return Ok(Verdict::Quit);
        }

        Ok(match input.trim().to_lowercase().as_str() {
            "y" => Verdict::Accept,
            "q" => Verdict::Quit,
            _ => Verdict::Reject,
        })
    }
}

/// Which side of the alignment to render.
#[derive(Clone, Copy)]
enum Side {
    Older,
    Newer,
}

/// Print one candidate with similarity, size delta, and colorized names.
pub fn print_candidate(pair: &CandidatePair, index: usize, total: usize) {
    let similarity = (pair.similarity() * 100.0).round();

    println!();
    println!("{}", "─".repeat(60).dim());
    println!(
        "[{:3}/{:3}] similarity {}%",
        index,
        total,
        format!("{similarity:.0}").green()
    );

    let size_line = format!(
        "size diff: {} ({:.1}%)",
        ByteSize::b(pair.size_diff_bytes()),
        pair.size_diff_percent()
    );
    if pair.size_diff_bytes() > SIZE_WARN_BYTES {
        println!("          {}", size_line.red().bold());
    } else {
        println!("          {}", size_line.dim());
    }

    println!("  old: {}", render_side(&pair.alignment, Side::Older));
    println!("  new: {}", render_side(&pair.alignment, Side::Newer));
}

/// Render one side of the alignment with per-segment coloring: removed
/// characters red, replaced green, inserted blue; characters from the
/// stripped class are dimmed wherever they appear in a changed segment.
fn render_side(alignment: &NameAlignment, side: Side) -> String {
    let mut out = String::new();
    for op in alignment.ops() {
        let (chars, range) = match side {
            Side::Older => (alignment.old_chars(), op.old_range()),
            Side::Newer => (alignment.new_chars(), op.new_range()),
        };
        for &c in &chars[range] {
            let painted = if op.tag() == DiffTag::Equal {
                c.to_string()
            } else if is_noise_char(c) {
                c.dim().to_string()
            } else {
                match op.tag() {
                    DiffTag::Delete => c.red().to_string(),
                    DiffTag::Replace => c.green().to_string(),
                    _ => c.blue().to_string(),
                }
            };
            out.push_str(&painted);
        }
    }
    out
}
