#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use ricemill::App;
use ricemill::db::Store;
use ricemill::dialog::{Dialogs, FileFilter};
use tempfile::TempDir;

/// Answers dialogs from a queue; an exhausted queue or a `None` entry
/// behaves like the user dismissing the dialog.
#[derive(Clone, Default)]
pub struct ScriptedDialogs {
    answers: Rc<RefCell<VecDeque<Option<PathBuf>>>>,
    asked: Rc<RefCell<Vec<String>>>,
}

impl ScriptedDialogs {
    pub fn answer(&self, path: impl AsRef<Path>) {
        self.answers
            .borrow_mut()
            .push_back(Some(path.as_ref().to_path_buf()));
    }

    pub fn dismiss(&self) {
        self.answers.borrow_mut().push_back(None);
    }

    /// Default names (saves) or filter names (opens) seen so far.
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    fn next(&self) -> Option<PathBuf> {
        self.answers.borrow_mut().pop_front().flatten()
    }
}

impl Dialogs for ScriptedDialogs {
    fn save_file(&self, default_name: &str) -> Option<PathBuf> {
        self.asked.borrow_mut().push(default_name.to_string());
        self.next()
    }

    fn open_file(&self, filter: FileFilter) -> Option<PathBuf> {
        self.asked.borrow_mut().push(filter.name.to_string());
        self.next()
    }
}

pub struct Fixture {
    pub dir: TempDir,
    pub dialogs: ScriptedDialogs,
    pub store: Store,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let store = Store::open(dir.path().join("data").join("ricemill.db")).expect("open store");
        Self {
            dir,
            dialogs: ScriptedDialogs::default(),
            store,
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

pub fn app() -> (App, ScriptedDialogs, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let store = Store::open(dir.path().join("ricemill.db")).expect("open store");
    let dialogs = ScriptedDialogs::default();
    let app = App::new(store, Box::new(dialogs.clone()));
    (app, dialogs, dir)
}
