use crate::report::{display_char, display_label};
use std::io::{self, Write};

pub const HEADER: &str = "source\tbase\tcount\n";

pub fn write_rows(w: &mut dyn Write, label: &str, entries: &[(char, u64)]) -> io::Result<()> {
    let label = display_label(label);
    for &(c, n) in entries {
        writeln!(w, "{}\t{}\t{}", label, display_char(c), n)?;
    }
    Ok(())
}
