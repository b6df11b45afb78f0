#![allow(dead_code)]

use basic::lang::Line;
use basic::mach::{Console, FileSystem, Runtime};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::{self, BufRead, Cursor, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Buffered console: canned input lines in, captured output text out.
pub struct TestConsole {
    input: VecDeque<String>,
    pub output: String,
}

impl TestConsole {
    pub fn new(input: &[&str]) -> TestConsole {
        TestConsole {
            input: input.iter().map(|s| s.to_string()).collect(),
            output: String::new(),
        }
    }
}

impl Console for TestConsole {
    fn read_line(&mut self) -> Option<String> {
        self.input.pop_front()
    }

    fn print(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn println(&mut self, text: &str) {
        self.output.push_str(text);
        self.output.push('\n');
    }
}

/// In-memory file system for channel tests.
#[derive(Clone, Default)]
pub struct MemFs {
    files: Rc<RefCell<HashMap<PathBuf, Vec<u8>>>>,
}

impl MemFs {
    pub fn new() -> MemFs {
        MemFs::default()
    }

    /// Pre-seed a file, keyed the way the runtime will resolve the name.
    pub fn seed(&self, name: &str, contents: &str) {
        self.files
            .borrow_mut()
            .insert(resolve(name), contents.as_bytes().to_vec());
    }

    pub fn contents(&self, name: &str) -> Option<String> {
        self.files
            .borrow()
            .get(&resolve(name))
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

fn resolve(name: &str) -> PathBuf {
    let path = Path::new(name);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap().join(path)
    }
}

impl FileSystem for MemFs {
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn BufRead>> {
        match self.files.borrow().get(path) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such file")),
        }
    }

    fn open_write(&self, path: &Path, append: bool) -> io::Result<Box<dyn Write>> {
        let mut files = self.files.borrow_mut();
        let entry = files.entry(path.to_path_buf()).or_default();
        if !append {
            entry.clear();
        }
        Ok(Box::new(MemWriter {
            path: path.to_path_buf(),
            files: self.files.clone(),
        }))
    }
}

struct MemWriter {
    path: PathBuf,
    files: Rc<RefCell<HashMap<PathBuf, Vec<u8>>>>,
}

impl Write for MemWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.files
            .borrow_mut()
            .entry(self.path.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn runtime_with(lines: &[&str]) -> Runtime {
    let mut runtime = Runtime::new();
    for raw in lines {
        let line = Line::new(raw);
        let number = line
            .number()
            .unwrap_or_else(|| panic!("test line has no number: {}", raw));
        runtime.program_mut().set_line(number, line.source());
    }
    runtime
}

/// Run a program to completion and return everything it printed. Panics
/// on any error; use `run_error` to assert on failures.
pub fn run_program(lines: &[&str], input: &[&str]) -> String {
    let mut runtime = runtime_with(lines);
    let mut console = TestConsole::new(input);
    let fs = MemFs::new();
    match runtime.run(&mut console, &fs) {
        Ok(()) => console.output,
        Err(error) => panic!("unexpected error: {} (output so far: {:?})", error, console.output),
    }
}

/// Run a program expected to fail; returns (output, error message).
pub fn run_error(lines: &[&str], input: &[&str]) -> (String, String) {
    let mut runtime = runtime_with(lines);
    let mut console = TestConsole::new(input);
    let fs = MemFs::new();
    match runtime.run(&mut console, &fs) {
        Ok(()) => panic!("expected an error (output: {:?})", console.output),
        Err(error) => (console.output, error.to_string()),
    }
}

/// Run against a caller-supplied file system.
pub fn run_with_fs(lines: &[&str], input: &[&str], fs: &MemFs) -> String {
    let mut runtime = runtime_with(lines);
    let mut console = TestConsole::new(input);
    match runtime.run(&mut console, fs) {
        Ok(()) => console.output,
        Err(error) => panic!("unexpected error: {} (output so far: {:?})", error, console.output),
    }
}
