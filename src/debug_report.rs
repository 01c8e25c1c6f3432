use polofield::{KnownRules, RuleBlock};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const RED: &str = "\x1b[31m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(block: &RuleBlock, outcome: Option<(&str, &KnownRules)>, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Recognizing: \"{}\"", block.text), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Block ━━━", ansi::GRAY));
    for line in &block.rules {
        println!("  {}", palette.dim(line));
    }

    println!("\n{}", palette.paint("━━━ Recognition ━━━", ansi::GRAY));
    match outcome {
        Some((name, known)) => {
            println!(
                "  {} {}",
                palette.paint("✓ matched", ansi::GREEN),
                palette.bold(palette.paint(name, ansi::CYAN))
            );
            print_intervals(known, &palette);
        }
        None => {
            println!("  {}", palette.paint("✗ no recognizer matched", ansi::RED));
            println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
            println!("  • The block heading dates are fine but a body line deviates from every grammar");
            println!("  • A stateful recognizer hit a line its current section does not allow");
            println!("\n{}", palette.dim("  Tip: set RUST_LOG=polofield=debug for per-line rejection traces"));
        }
    }
    println!();
}

fn print_intervals(known: &KnownRules, palette: &ansi::Palette) {
    println!("\n{}", palette.paint("━━━ Intervals ━━━", ansi::GRAY));
    for (idx, interval) in known.intervals.iter().enumerate() {
        let status = if interval.open {
            palette.paint("open  ", ansi::GREEN)
        } else {
            palette.paint("closed", ansi::RED)
        };
        let mut line = format!(
            "  {} {} {} {} {}",
            palette.paint(format!("[{}]", idx), ansi::GRAY),
            status,
            palette.paint(&interval.start_timestamp, ansi::YELLOW),
            palette.dim("→"),
            palette.paint(&interval.end_timestamp, ansi::YELLOW),
        );
        if let Some(comment) = &interval.comment {
            line.push_str(&format!("  {} {}", palette.dim("│"), palette.paint(comment, ansi::CYAN)));
        }
        println!("{line}");
    }
}
