use crate::report::{display_char, display_label};
use std::io::{self, Write};

/// A label line followed by one `Base <c>\tCount <n>` line per entry.
pub fn write_block(w: &mut dyn Write, label: &str, entries: &[(char, u64)]) -> io::Result<()> {
    writeln!(w, "{}", display_label(label))?;
    for &(c, n) in entries {
        writeln!(w, "Base {}\tCount {}", display_char(c), n)?;
    }
    Ok(())
}
