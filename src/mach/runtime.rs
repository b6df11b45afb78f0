use super::io::absolutize;
use super::{
    Arrays, CompiledProgram, Console, FileSystem, Function, Operation, Program, ProgramCounter,
    Rng, Val, Var, EPSILON,
};
use crate::error;
use crate::lang::ast::{Expression, OpenMode, PrintItem, Statement, Variable};
use crate::lang::Error;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Result<T> = std::result::Result<T, Error>;

/// Console and file access bundled for the duration of one run.
struct Io<'a> {
    console: &'a mut dyn Console,
    fs: &'a dyn FileSystem,
}

/// An active FOR loop: the variable, the limit and step evaluated at
/// entry, and the position of the first body statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ForFrame {
    var: String,
    limit: f64,
    step: f64,
    body: ProgramCounter,
}

#[derive(Debug, Clone)]
struct UserFn {
    params: Vec<String>,
    body: Expression,
}

enum Channel {
    Read {
        reader: Box<dyn BufRead>,
        pending: VecDeque<String>,
    },
    Write {
        writer: Box<dyn Write>,
    },
}

/// The executor. Owns all runtime state; statements never touch the
/// program counter directly but stage jumps through `pending_jump`, which
/// the run loop applies after each statement.
pub struct Runtime {
    program: Program,
    vars: Var,
    arrays: Arrays,
    gosub_stack: Vec<ProgramCounter>,
    for_stack: Vec<ForFrame>,
    data: Vec<(u16, Val)>,
    data_index: usize,
    functions: HashMap<String, UserFn>,
    channels: BTreeMap<i32, Channel>,
    rng: Rng,
    pending_jump: Option<ProgramCounter>,
    pending_chars: VecDeque<char>,
    stop: bool,
    interrupt: Arc<AtomicBool>,
}

impl Default for Runtime {
    fn default() -> Runtime {
        Runtime::new()
    }
}

impl Runtime {
    pub fn new() -> Runtime {
        Runtime {
            program: Program::new(),
            vars: Var::new(),
            arrays: Arrays::new(),
            gosub_stack: vec![],
            for_stack: vec![],
            data: vec![],
            data_index: 0,
            functions: HashMap::new(),
            channels: BTreeMap::new(),
            rng: Rng::new(),
            pending_jump: None,
            pending_chars: VecDeque::new(),
            stop: false,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag a signal handler may set; the run loop honors it at the
    /// next statement boundary.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        self.interrupt.clone()
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn program_mut(&mut self) -> &mut Program {
        &mut self.program
    }

    /// CLEAR: reset runtime state, keep the stored program and the
    /// parser's function registry.
    pub fn clear_state(&mut self) {
        self.vars.clear();
        self.arrays.clear();
        self.gosub_stack.clear();
        self.for_stack.clear();
        self.data_index = 0;
        self.functions.clear();
        self.channels.clear();
        self.rng = Rng::new();
        self.pending_jump = None;
        self.pending_chars.clear();
        self.stop = false;
    }

    /// NEW: drop the program, its registry, and all runtime state.
    pub fn new_program(&mut self) {
        self.program.clear();
        self.clear_state();
    }

    /// Compile and run the stored program from the top. Channels are torn
    /// down however the loop exits.
    pub fn run(&mut self, console: &mut dyn Console, fs: &dyn FileSystem) -> Result<()> {
        self.clear_state();
        let compiled = self.program.compile()?;
        self.data = compiled.data().to_vec();
        let mut io = Io { console, fs };
        let result = self.execute(&compiled, &mut io);
        self.channels.clear();
        result
    }

    fn execute(&mut self, compiled: &CompiledProgram, io: &mut Io) -> Result<()> {
        let mut pc = ProgramCounter::default();
        loop {
            if self.interrupt.swap(false, Ordering::SeqCst) {
                break;
            }
            let statement = match compiled.fetch(&mut pc) {
                Some(statement) => statement,
                None => break,
            };
            self.pending_jump = None;
            self.statement(compiled, pc, statement, io)?;
            if self.stop {
                break;
            }
            pc = match self.pending_jump.take() {
                Some(target) => target,
                None => pc.next(),
            };
        }
        Ok(())
    }

    fn statement(
        &mut self,
        compiled: &CompiledProgram,
        pc: ProgramCounter,
        statement: &Statement,
        io: &mut Io,
    ) -> Result<()> {
        match statement {
            Statement::Rem => Ok(()),
            Statement::End | Statement::Stop => {
                self.stop = true;
                Ok(())
            }
            Statement::Clear => {
                self.clear_state();
                Ok(())
            }
            Statement::Let(target, expr) => self.r#let(target, expr, io),
            Statement::Dim(entries) => self.r#dim(entries, io),
            Statement::Goto(expr) => self.r#goto(compiled, expr, io),
            Statement::Gosub(expr) => self.r#gosub(compiled, pc, expr, io),
            Statement::Return => self.r#return(),
            Statement::OnGoto(selector, lines) => {
                self.r#on(compiled, pc, selector, lines, false, io)
            }
            Statement::OnGosub(selector, lines) => {
                self.r#on(compiled, pc, selector, lines, true, io)
            }
            Statement::For(name, from, to, step) => self.r#for(pc, name, from, to, step, io),
            Statement::Next(name) => self.r#next(name.as_deref()),
            Statement::If(predicate, then_branch, else_branch) => {
                self.r#if(compiled, pc, predicate, then_branch, else_branch, io)
            }
            Statement::Print(channel, items) => self.r#print(channel.as_ref(), items, io),
            Statement::Input(prompt, channel, targets) => {
                self.r#input(prompt.as_deref(), channel.as_ref(), targets, io)
            }
            Statement::Read(targets) => self.r#read(targets, io),
            Statement::Data(_) => Ok(()),
            Statement::Restore(expr) => self.r#restore(expr.as_ref(), io),
            Statement::Randomize(expr) => self.r#randomize(expr.as_ref(), io),
            Statement::Def(name, params, body) => self.r#def(name, params, body),
            Statement::Open(path, mode, channel) => self.r#open(path, *mode, channel, io),
            Statement::Close(channels) => self.r#close(channels, io),
        }
    }

    /// Run a branch of an IF inline. A jump or stop raised inside the
    /// branch abandons the rest of it; the run loop takes over.
    fn block(
        &mut self,
        compiled: &CompiledProgram,
        pc: ProgramCounter,
        statements: &[Statement],
        io: &mut Io,
    ) -> Result<()> {
        for statement in statements {
            self.statement(compiled, pc, statement, io)?;
            if self.stop || self.pending_jump.is_some() {
                break;
            }
        }
        Ok(())
    }

    fn r#let(&mut self, target: &Variable, expr: &Expression, io: &mut Io) -> Result<()> {
        let value = self.eval(expr, io)?;
        self.assign(target, value, io)
    }

    fn assign(&mut self, target: &Variable, value: Val, io: &mut Io) -> Result<()> {
        if target.indices.is_empty() {
            self.vars.store(&target.name, value);
            Ok(())
        } else {
            let indices = self.indices(&target.indices, io)?;
            self.arrays.store(&target.name, &indices, value)
        }
    }

    fn r#dim(&mut self, entries: &[Variable], io: &mut Io) -> Result<()> {
        for entry in entries {
            let bounds = self.indices(&entry.indices, io)?;
            self.arrays.dimension(&entry.name, &bounds)?;
        }
        Ok(())
    }

    fn r#goto(&mut self, compiled: &CompiledProgram, expr: &Expression, io: &mut Io) -> Result<()> {
        let number = self.eval(expr, io)?.as_int();
        self.jump(compiled, number)
    }

    fn r#gosub(
        &mut self,
        compiled: &CompiledProgram,
        pc: ProgramCounter,
        expr: &Expression,
        io: &mut Io,
    ) -> Result<()> {
        let number = self.eval(expr, io)?.as_int();
        self.gosub_stack.push(pc.next());
        self.jump(compiled, number)
    }

    fn r#return(&mut self) -> Result<()> {
        match self.gosub_stack.pop() {
            Some(target) => {
                self.pending_jump = Some(target);
                Ok(())
            }
            None => Err(error!(Runtime; "RETURN without GOSUB")),
        }
    }

    /// ON with a selector outside 1..=len falls through without jumping.
    fn r#on(
        &mut self,
        compiled: &CompiledProgram,
        pc: ProgramCounter,
        selector: &Expression,
        lines: &[u16],
        gosub: bool,
        io: &mut Io,
    ) -> Result<()> {
        let k = self.eval(selector, io)?.as_int();
        if k < 1 || k as usize > lines.len() {
            return Ok(());
        }
        if gosub {
            self.gosub_stack.push(pc.next());
        }
        self.jump(compiled, lines[k as usize - 1] as i32)
    }

    fn jump(&mut self, compiled: &CompiledProgram, number: i32) -> Result<()> {
        let index = if (0..=u16::max_value() as i32).contains(&number) {
            compiled.line_index(number as u16)
        } else {
            None
        };
        match index {
            Some(line) => {
                self.pending_jump = Some(ProgramCounter::at_line(line));
                Ok(())
            }
            None => Err(error!(Runtime; "Undefined line {}", number)),
        }
    }

    fn r#for(
        &mut self,
        pc: ProgramCounter,
        name: &str,
        from: &Expression,
        to: &Expression,
        step: &Expression,
        io: &mut Io,
    ) -> Result<()> {
        let start = self.eval(from, io)?.as_number();
        let limit = self.eval(to, io)?.as_number();
        let step = self.eval(step, io)?.as_number();
        self.vars.store(name, Val::Number(start));
        self.for_stack.push(ForFrame {
            var: name.to_string(),
            limit,
            step,
            body: pc.next(),
        });
        Ok(())
    }

    /// A named NEXT unwinds the stack to its loop, discarding inner
    /// frames. The frame goes back on the stack only while the loop keeps
    /// running.
    fn r#next(&mut self, name: Option<&str>) -> Result<()> {
        if self.for_stack.is_empty() {
            return Err(error!(Runtime; "NEXT without FOR"));
        }
        let frame = match name {
            None => self.for_stack.pop().unwrap(),
            Some(name) => match self.for_stack.iter().rposition(|f| f.var == name) {
                Some(found) => {
                    self.for_stack.truncate(found + 1);
                    self.for_stack.pop().unwrap()
                }
                None => return Err(error!(Runtime; "NEXT without matching FOR")),
            },
        };
        let value = self.vars.fetch(&frame.var).as_number() + frame.step;
        self.vars.store(&frame.var, Val::Number(value));
        let proceed = if frame.step > 0.0 {
            value <= frame.limit + EPSILON
        } else if frame.step < 0.0 {
            value >= frame.limit - EPSILON
        } else {
            false
        };
        if proceed {
            self.pending_jump = Some(frame.body);
            self.for_stack.push(frame);
        }
        Ok(())
    }

    fn r#if(
        &mut self,
        compiled: &CompiledProgram,
        pc: ProgramCounter,
        predicate: &Expression,
        then_branch: &[Statement],
        else_branch: &[Statement],
        io: &mut Io,
    ) -> Result<()> {
        let taken = self.eval(predicate, io)?.as_number() != 0.0;
        if taken {
            self.block(compiled, pc, then_branch, io)
        } else {
            self.block(compiled, pc, else_branch, io)
        }
    }

    fn r#print(
        &mut self,
        channel: Option<&Expression>,
        items: &[PrintItem],
        io: &mut Io,
    ) -> Result<()> {
        let channel = match channel {
            Some(expr) => Some(self.eval(expr, io)?.as_int()),
            None => None,
        };
        let mut out = String::new();
        let mut newline = true;
        for item in items {
            match item {
                PrintItem::Expr(expr) => {
                    let value = self.eval(expr, io)?;
                    out.push_str(&value.print_string());
                    newline = true;
                }
                PrintItem::Comma => {
                    out.push(if channel.is_some() { ',' } else { '\t' });
                    newline = false;
                }
                PrintItem::Semicolon => newline = false,
            }
        }
        match channel {
            None => {
                if newline {
                    io.console.println(&out);
                } else {
                    io.console.print(&out);
                }
                Ok(())
            }
            Some(number) => self.channel_write(number, &out, newline),
        }
    }

    fn r#input(
        &mut self,
        prompt: Option<&str>,
        channel: Option<&Expression>,
        targets: &[Variable],
        io: &mut Io,
    ) -> Result<()> {
        match channel {
            Some(expr) => {
                let number = self.eval(expr, io)?.as_int();
                for target in targets {
                    let field = self.read_field(number)?;
                    let value = if target.is_string() {
                        Val::Text(field)
                    } else {
                        match field.trim().parse::<f64>() {
                            Ok(n) => Val::Number(n),
                            Err(_) => {
                                return Err(
                                    error!(Runtime; "Invalid numeric input '{}'", field),
                                )
                            }
                        }
                    };
                    self.assign(target, value, io)?;
                }
                Ok(())
            }
            None => {
                if let Some(prompt) = prompt {
                    io.console.print(prompt);
                }
                io.console.print("? ");
                for target in targets {
                    loop {
                        let line = match io.console.read_line() {
                            Some(line) => line,
                            None => {
                                return Err(error!(Runtime; "INPUT received end of stream"))
                            }
                        };
                        let raw = line.trim();
                        if target.is_string() {
                            let value = Val::Text(raw.to_string());
                            self.assign(target, value, io)?;
                            break;
                        }
                        match raw.parse::<f64>() {
                            Ok(n) => {
                                self.assign(target, Val::Number(n), io)?;
                                break;
                            }
                            Err(_) => {
                                io.console.println("?Redo from start");
                                io.console.print("? ");
                            }
                        }
                    }
                }
                Ok(())
            }
        }
    }

    fn r#read(&mut self, targets: &[Variable], io: &mut Io) -> Result<()> {
        for target in targets {
            let value = match self.data.get(self.data_index) {
                Some((_, value)) => value.clone(),
                None => return Err(error!(Runtime; "Out of data")),
            };
            self.data_index += 1;
            self.assign(target, value, io)?;
        }
        Ok(())
    }

    /// RESTORE with a line moves the pointer to the first DATA item at or
    /// past that line; with none, back to the top.
    fn r#restore(&mut self, expr: Option<&Expression>, io: &mut Io) -> Result<()> {
        self.data_index = match expr {
            None => 0,
            Some(expr) => {
                let line = self.eval(expr, io)?.as_int();
                self.data
                    .iter()
                    .position(|(number, _)| *number as i32 >= line)
                    .unwrap_or_else(|| self.data.len())
            }
        };
        Ok(())
    }

    fn r#randomize(&mut self, expr: Option<&Expression>, io: &mut Io) -> Result<()> {
        let seed = match expr {
            Some(expr) => self.eval(expr, io)?.as_int().wrapping_abs() as u32,
            None => chrono::Utc::now().timestamp_millis() as u32,
        };
        self.rng.reseed(seed);
        Ok(())
    }

    fn r#def(&mut self, name: &str, params: &[String], body: &Expression) -> Result<()> {
        self.functions.insert(
            name.to_string(),
            UserFn {
                params: params.to_vec(),
                body: body.clone(),
            },
        );
        Ok(())
    }

    fn r#open(
        &mut self,
        path: &Expression,
        mode: OpenMode,
        channel: &Expression,
        io: &mut Io,
    ) -> Result<()> {
        let path = self.eval(path, io)?.as_string();
        let number = self.eval(channel, io)?.as_int();
        // A channel number in use is implicitly closed by re-OPEN.
        self.channels.remove(&number);
        let path = absolutize(&path);
        let opened = match mode {
            OpenMode::Input => io.fs.open_read(&path).map(|reader| Channel::Read {
                reader,
                pending: VecDeque::new(),
            }),
            OpenMode::Output => io
                .fs
                .open_write(&path, false)
                .map(|writer| Channel::Write { writer }),
            OpenMode::Append => io
                .fs
                .open_write(&path, true)
                .map(|writer| Channel::Write { writer }),
        };
        match opened {
            Ok(channel) => {
                self.channels.insert(number, channel);
                Ok(())
            }
            Err(e) => Err(error!(Runtime; "Cannot open '{}': {}", path.display(), e)),
        }
    }

    /// Bare CLOSE closes everything; closing a channel that is not open is
    /// a no-op.
    fn r#close(&mut self, channels: &[Expression], io: &mut Io) -> Result<()> {
        if channels.is_empty() {
            self.channels.clear();
            return Ok(());
        }
        for expr in channels {
            let number = self.eval(expr, io)?.as_int();
            self.channels.remove(&number);
        }
        Ok(())
    }

    fn channel_write(&mut self, channel: i32, text: &str, newline: bool) -> Result<()> {
        match self.channels.get_mut(&channel) {
            Some(Channel::Write { writer }) => {
                let write = if newline {
                    writer
                        .write_all(text.as_bytes())
                        .and_then(|_| writer.write_all(b"\n"))
                } else {
                    writer.write_all(text.as_bytes())
                };
                write
                    .and_then(|_| writer.flush())
                    .map_err(|e| error!(Runtime; "Write error on channel {}: {}", channel, e))
            }
            _ => Err(error!(Runtime; "File #{} is not open for output", channel)),
        }
    }

    /// Pop the next INPUT# field, refilling the queue from the next line.
    /// Fields split on commas outside quotes; a quoted field drops its
    /// outer quotes and collapses doubled quotes.
    fn read_field(&mut self, channel: i32) -> Result<String> {
        match self.channels.get_mut(&channel) {
            Some(Channel::Read { reader, pending }) => {
                if pending.is_empty() {
                    let mut line = String::new();
                    let read = reader.read_line(&mut line).map_err(
                        |e| error!(Runtime; "Read error on channel {}: {}", channel, e),
                    )?;
                    if read == 0 {
                        return Err(error!(Runtime; "End of file on channel {}", channel));
                    }
                    while line.ends_with('\n') || line.ends_with('\r') {
                        line.pop();
                    }
                    for field in split_fields(&line) {
                        pending.push_back(field);
                    }
                }
                Ok(pending.pop_front().unwrap_or_default())
            }
            _ => Err(error!(Runtime; "File #{} is not open for input", channel)),
        }
    }

    fn indices(&mut self, exprs: &[Expression], io: &mut Io) -> Result<Vec<i32>> {
        let mut indices = Vec::with_capacity(exprs.len());
        for expr in exprs {
            indices.push(self.eval(expr, io)?.as_int());
        }
        Ok(indices)
    }

    fn eval_list(&mut self, exprs: &[Expression], io: &mut Io) -> Result<Vec<Val>> {
        let mut values = Vec::with_capacity(exprs.len());
        for expr in exprs {
            values.push(self.eval(expr, io)?);
        }
        Ok(values)
    }

    fn eval(&mut self, expr: &Expression, io: &mut Io) -> Result<Val> {
        use Expression::*;
        match expr {
            Number(n) => Ok(Val::Number(*n)),
            String(s) => Ok(Val::Text(s.clone())),
            Variable(name) => Ok(self.vars.fetch(name)),
            Array(name, indices) => {
                let indices = self.indices(indices, io)?;
                self.arrays.fetch(name, &indices)
            }
            Builtin(name, args) => self.builtin(name, args, io),
            UserFn(name, args) => self.user_function(name, args, io),
            Negate(e) => Ok(Operation::negate(self.eval(e, io)?)),
            Not(e) => Ok(Operation::not(self.eval(e, io)?)),
            Power(l, r) => Ok(Operation::power(self.eval(l, io)?, self.eval(r, io)?)),
            Multiply(l, r) => Ok(Operation::multiply(self.eval(l, io)?, self.eval(r, io)?)),
            Divide(l, r) => Operation::divide(self.eval(l, io)?, self.eval(r, io)?),
            Add(l, r) => Ok(Operation::sum(self.eval(l, io)?, self.eval(r, io)?)),
            Subtract(l, r) => Ok(Operation::subtract(self.eval(l, io)?, self.eval(r, io)?)),
            Equal(l, r) => Ok(Operation::equal(self.eval(l, io)?, self.eval(r, io)?)),
            NotEqual(l, r) => Ok(Operation::not_equal(self.eval(l, io)?, self.eval(r, io)?)),
            Less(l, r) => Ok(Operation::less(self.eval(l, io)?, self.eval(r, io)?)),
            LessEqual(l, r) => Ok(Operation::less_equal(self.eval(l, io)?, self.eval(r, io)?)),
            Greater(l, r) => Ok(Operation::greater(self.eval(l, io)?, self.eval(r, io)?)),
            GreaterEqual(l, r) => {
                Ok(Operation::greater_equal(self.eval(l, io)?, self.eval(r, io)?))
            }
            And(l, r) => Ok(Operation::and(self.eval(l, io)?, self.eval(r, io)?)),
            Or(l, r) => Ok(Operation::or(self.eval(l, io)?, self.eval(r, io)?)),
        }
    }

    fn builtin(&mut self, name: &str, args: &[Expression], io: &mut Io) -> Result<Val> {
        let arity = match Function::arity(name) {
            Some(arity) => arity,
            None => return Err(error!(Runtime; "Unknown function {}", name)),
        };
        if !arity.contains(&args.len()) {
            return Err(error!(Runtime; "Wrong number of arguments for {}", name));
        }
        match name {
            "GET" => self.get_char(io),
            "RND" => {
                let values = self.eval_list(args, io)?;
                Ok(Function::rnd(&mut self.rng, values.first()))
            }
            _ => {
                let values = self.eval_list(args, io)?;
                Function::call(name, &values)
            }
        }
    }

    /// GET: the code of the next input character. An empty pending buffer
    /// reads a whole line and appends the newline.
    fn get_char(&mut self, io: &mut Io) -> Result<Val> {
        if self.pending_chars.is_empty() {
            match io.console.read_line() {
                Some(line) => {
                    self.pending_chars.extend(line.chars());
                    self.pending_chars.push_back('\n');
                }
                None => return Err(error!(Runtime; "INPUT received end of stream")),
            }
        }
        let ch = self.pending_chars.pop_front().unwrap();
        Ok(Val::Number(ch as u32 as f64))
    }

    /// Call a user function: arguments shadow the parameter names in the
    /// global variable table for the duration of the body, then the prior
    /// bindings come back. Nesting and self-reference both work through
    /// the same save/restore.
    fn user_function(&mut self, name: &str, args: &[Expression], io: &mut Io) -> Result<Val> {
        let function = match self.functions.get(name) {
            Some(function) => function.clone(),
            None => return Err(error!(Runtime; "Unknown function {}", name)),
        };
        if args.len() != function.params.len() {
            return Err(error!(Runtime; "Wrong number of arguments for {}", name));
        }
        let values = self.eval_list(args, io)?;
        let mut saved = Vec::with_capacity(function.params.len());
        for (param, value) in function.params.iter().zip(values) {
            saved.push((param.clone(), self.vars.take(param)));
            self.vars.store(param, value);
        }
        let result = self.eval(&function.body, io);
        for (param, previous) in saved.into_iter().rev() {
            self.vars.restore(&param, previous);
        }
        result
    }
}

fn split_fields(line: &str) -> Vec<String> {
    let mut fields = vec![];
    let mut field = String::new();
    let mut in_quotes = false;
    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                field.push('"');
            }
            ',' if !in_quotes => {
                fields.push(clean_field(&field));
                field.clear();
            }
            _ => field.push(ch),
        }
    }
    fields.push(clean_field(&field));
    fields
}

fn clean_field(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    stripped.replace("\"\"", "\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_fields() {
        assert_eq!(split_fields("1,2,3"), vec!["1", "2", "3"]);
        assert_eq!(
            split_fields(r#""A,B",C"#),
            vec!["A,B".to_string(), "C".to_string()]
        );
        assert_eq!(
            split_fields(r#""SAY ""HI""""#),
            vec!["SAY \"HI\"".to_string()]
        );
        assert_eq!(split_fields(" X , Y "), vec!["X", "Y"]);
    }
}
