use super::Val;
use crate::lang::ast::{Expression, Statement};
use crate::lang::{normalize, parse, tokenize, Error};
use std::collections::{BTreeMap, HashMap, HashSet};

type Result<T> = std::result::Result<T, Error>;

/// The program store: source text by line number, in ascending order, plus
/// the parser's registry of DEF'd function names. The registry survives
/// CLEAR and recompiles; NEW resets it along with the lines.
#[derive(Debug, Default)]
pub struct Program {
    lines: BTreeMap<u16, String>,
    functions: HashSet<String>,
}

impl Program {
    pub fn new() -> Program {
        Program::default()
    }

    /// Store a line. Empty source removes the line, so typing a bare line
    /// number deletes it.
    pub fn set_line(&mut self, number: u16, source: &str) {
        let source = normalize(source);
        if source.is_empty() {
            self.lines.remove(&number);
        } else {
            self.lines.insert(number, source);
        }
    }

    pub fn remove_line(&mut self, number: u16) {
        self.lines.remove(&number);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.functions.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = (u16, &str)> {
        self.lines.iter().map(|(&number, source)| (number, source.as_str()))
    }

    /// Parse every stored line in ascending order. The first failure is
    /// reported as `Line <n>: <message>`. DATA literals are collected into
    /// the data table as a side product, in program order.
    pub fn compile(&mut self) -> Result<CompiledProgram> {
        let mut lines = vec![];
        let mut index = HashMap::new();
        let mut data = vec![];
        for (&number, source) in &self.lines {
            let tokens =
                tokenize(source).map_err(|e| e.in_line_number(Some(number)))?;
            let statements = parse(&tokens, &mut self.functions)
                .map_err(|e| e.in_line_number(Some(number)))?;
            collect_data(&statements, number, &mut data);
            index.insert(number, lines.len());
            lines.push(CompiledLine { number, statements });
        }
        Ok(CompiledProgram { lines, index, data })
    }
}

fn collect_data(statements: &[Statement], number: u16, data: &mut Vec<(u16, Val)>) {
    for statement in statements {
        match statement {
            Statement::Data(items) => {
                for item in items {
                    match item {
                        Expression::Number(n) => data.push((number, Val::Number(*n))),
                        Expression::String(s) => data.push((number, Val::Text(s.clone()))),
                        _ => {}
                    }
                }
            }
            Statement::If(_, then_branch, else_branch) => {
                collect_data(then_branch, number, data);
                collect_data(else_branch, number, data);
            }
            _ => {}
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct CompiledLine {
    pub number: u16,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Default)]
pub struct CompiledProgram {
    lines: Vec<CompiledLine>,
    index: HashMap<u16, usize>,
    data: Vec<(u16, Val)>,
}

impl CompiledProgram {
    /// The statement under `pc`, stepping over line ends. Leaves `pc`
    /// normalized to the statement actually returned; `None` means the
    /// counter ran off the program.
    pub fn fetch(&self, pc: &mut ProgramCounter) -> Option<&Statement> {
        loop {
            let line = self.lines.get(pc.line)?;
            if pc.statement < line.statements.len() {
                return Some(&line.statements[pc.statement]);
            }
            *pc = ProgramCounter {
                line: pc.line + 1,
                statement: 0,
            };
        }
    }

    pub fn line_index(&self, number: u16) -> Option<usize> {
        self.index.get(&number).copied()
    }

    pub fn lines(&self) -> &[CompiledLine] {
        &self.lines
    }

    pub fn data(&self) -> &[(u16, Val)] {
        &self.data
    }
}

/// A position in the compiled program: which line, which statement on it.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ProgramCounter {
    pub line: usize,
    pub statement: usize,
}

impl ProgramCounter {
    pub fn at_line(line: usize) -> ProgramCounter {
        ProgramCounter { line, statement: 0 }
    }

    pub fn next(self) -> ProgramCounter {
        ProgramCounter {
            line: self.line,
            statement: self.statement + 1,
        }
    }
}
