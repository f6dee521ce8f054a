use std::io::{self, Read, Write};
use std::path::PathBuf;
use text_io::try_read;

/// Restricts which files an open dialog offers.
#[derive(Debug, Clone, Copy)]
pub struct FileFilter {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

pub const CSV_FILES: FileFilter = FileFilter {
    name: "CSV",
    extensions: &["csv"],
};

pub const DB_FILES: FileFilter = FileFilter {
    name: "DB",
    extensions: &["db"],
};

/// File pickers. `None` means the user dismissed the dialog.
pub trait Dialogs {
    fn save_file(&self, default_name: &str) -> Option<PathBuf>;
    fn open_file(&self, filter: FileFilter) -> Option<PathBuf>;
}

/// Asks on stderr and reads the answer from the next stdin line. An empty
/// answer accepts the default for saves and cancels opens; a lone `-`
/// cancels either. An unreadable or closed stdin cancels.
pub struct TerminalDialogs;

impl TerminalDialogs {
    fn ask(prompt: &str) -> Option<String> {
        eprint!("{prompt}");
        io::stderr().flush().ok()?;
        read_answer(io::stdin().bytes().map_while(Result::ok))
    }
}

/// One line of input, or `None` once the input is exhausted.
fn read_answer(input: impl Iterator<Item = u8>) -> Option<String> {
    // text_io reads an exhausted input as an empty line
    let mut input = input.peekable();
    input.peek()?;
    try_read!("{}\n", input).ok()
}

fn save_choice(answer: Option<&str>, default_name: &str) -> Option<PathBuf> {
    match answer?.trim() {
        "-" => None,
        "" => Some(PathBuf::from(default_name)),
        path => Some(PathBuf::from(path)),
    }
}

fn open_choice(answer: Option<&str>) -> Option<PathBuf> {
    match answer?.trim() {
        "" | "-" => None,
        path => Some(PathBuf::from(path)),
    }
}

impl Dialogs for TerminalDialogs {
    fn save_file(&self, default_name: &str) -> Option<PathBuf> {
        let answer = Self::ask(&format!("save to [{default_name}]: "));
        save_choice(answer.as_deref(), default_name)
    }

    fn open_file(&self, filter: FileFilter) -> Option<PathBuf> {
        let patterns = filter
            .extensions
            .iter()
            .map(|ext| format!("*.{ext}"))
            .collect::<Vec<_>>()
            .join(", ");
        let answer = Self::ask(&format!("open {} file ({patterns}): ", filter.name));
        open_choice(answer.as_deref())
    }
}
