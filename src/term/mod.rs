extern crate ansi_term;
extern crate ctrlc;
extern crate rustyline;

use ansi_term::Style;
use basic::lang::{Error, Line};
use basic::mach::{DiskFs, Runtime, StdConsole};
use rustyline::error::ReadlineError;
use rustyline::Editor;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::sync::atomic::Ordering;

pub fn main() {
    if std::env::args().count() > 2 {
        println!("Usage: basic [FILENAME]");
        return;
    }
    let mut args = std::env::args();
    let _executable = args.next();
    let filename = args.next();

    let mut shell = Shell {
        runtime: Runtime::new(),
        path: None,
    };

    let interrupted = shell.runtime.interrupt_flag();
    ctrlc::set_handler(move || {
        interrupted.store(true, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    if let Some(filename) = filename {
        if shell.load(&filename) {
            shell.run();
        }
        return;
    }

    println!("classic BASIC");
    println!("READY.");
    let mut editor = Editor::<()>::new();
    loop {
        match editor.readline("") {
            Ok(input) => {
                if !input.trim().is_empty() {
                    editor.add_history_entry(&input);
                }
                if !shell.enter(&input) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{:?}", err);
                break;
            }
        }
    }
}

struct Shell {
    runtime: Runtime,
    path: Option<String>,
}

impl Shell {
    /// Handle one line of input: a numbered edit or a direct command.
    /// Returns false when the session should end.
    fn enter(&mut self, input: &str) -> bool {
        let line = Line::new(input);
        if let Some(number) = line.number() {
            self.runtime.program_mut().set_line(number, line.source());
            return true;
        }
        if line.is_empty() {
            return true;
        }
        let source = line.source().to_string();
        let mut words = source.splitn(2, ' ');
        let command = words.next().unwrap_or("");
        let rest = words.next().unwrap_or("").trim().to_string();
        match command {
            "RUN" => self.run(),
            "LIST" => self.list(),
            "NEW" => self.runtime.new_program(),
            "CLEAR" => self.runtime.clear_state(),
            "LOAD" => {
                self.load(&unquote(&rest));
            }
            "SAVE" => self.save(&unquote(&rest)),
            "BYE" | "EXIT" | "QUIT" => return false,
            _ => report(&basic::error!(Syntax; "Unknown command")),
        }
        true
    }

    fn run(&mut self) {
        let mut console = StdConsole;
        if let Err(error) = self.runtime.run(&mut console, &DiskFs) {
            report(&error);
        }
    }

    fn list(&self) {
        for (number, source) in self.runtime.program().lines() {
            println!("{} {}", number, source);
        }
    }

    /// Load a numbered-text program: integer, one space, source. Blank
    /// lines are ignored.
    fn load(&mut self, path: &str) -> bool {
        if path.is_empty() {
            report(&basic::error!(Syntax; "LOAD requires a file name"));
            return false;
        }
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(error) => {
                report(&basic::error!(Runtime; "Cannot open '{}': {}", path, error));
                return false;
            }
        };
        self.runtime.new_program();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(error) => {
                    report(&basic::error!(Runtime; "Cannot read '{}': {}", path, error));
                    return false;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let line = Line::new(&line);
            match line.number() {
                Some(number) => self.runtime.program_mut().set_line(number, line.source()),
                None => {
                    report(
                        &basic::error!(Syntax; "Missing line number in line {} of the file", index + 1),
                    );
                    return false;
                }
            }
        }
        self.path = Some(path.to_string());
        true
    }

    fn save(&mut self, path: &str) {
        let path = if path.is_empty() {
            match &self.path {
                Some(path) => path.clone(),
                None => {
                    report(&basic::error!(Syntax; "SAVE requires a file name"));
                    return;
                }
            }
        } else {
            path.to_string()
        };
        match fs::File::create(&path) {
            Ok(mut file) => {
                for (number, source) in self.runtime.program().lines() {
                    if let Err(error) = writeln!(file, "{} {}", number, source) {
                        report(&basic::error!(Runtime; "Cannot write '{}': {}", path, error));
                        return;
                    }
                }
                self.path = Some(path);
            }
            Err(error) => report(&basic::error!(Runtime; "Cannot write '{}': {}", path, error)),
        }
    }
}

fn report(error: &Error) {
    println!("{}", Style::new().bold().paint(format!("?{}", error)));
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}
