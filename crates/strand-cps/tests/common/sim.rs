//! Deterministic event-loop simulator for compiled output.
//!
//! Interprets a [`Module`] with function-scoped variables, a virtual clock
//! and the deferral-counter runtime, so tests can observe what a compiled
//! program prints and when.
//!
//! Globals: `print(...)`, `setTimeout(callback, ms, args...)` and the
//! counter constructor (`newDeferralCounter` by default).

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::rc::Rc;

use strand_cps::RuntimeNames;
use strand_syntax::ast::*;

pub type SimResult<T> = Result<T, String>;

/// What a program printed: (virtual time in ms, line).
pub type Trace = Vec<(u64, String)>;

const MAX_STEPS: usize = 1_000_000;

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Str(Rc<str>),
    Closure(Rc<Closure>),
    Builtin(Builtin),
    Counter(Rc<RefCell<Counter>>),
    Method(Rc<RefCell<Counter>>, CounterMethod),
    Deferred(Rc<Deferred>),
}

pub struct Closure {
    func: Function,
    env: Env,
}

#[derive(Debug, Clone, Copy)]
pub enum Builtin {
    Print,
    SetTimeout,
    NewCounter,
}

#[derive(Debug, Clone, Copy)]
pub enum CounterMethod {
    Defer,
    Wait,
}

#[derive(Default)]
pub struct Counter {
    outstanding: usize,
    continuation: Option<Value>,
    waited: bool,
}

pub struct Deferred {
    counter: Rc<RefCell<Counter>>,
    assign: Option<Value>,
    fired: Cell<bool>,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Str(s) => write!(f, "{}", s),
            Value::Closure(_) | Value::Builtin(_) | Value::Method(..) | Value::Deferred(_) => {
                write!(f, "<function>")
            }
            Value::Counter(_) => write!(f, "<counter>"),
        }
    }
}

impl Value {
    fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }
}

type Env = Rc<Scope>;

/// One function activation. Blocks do not open scopes.
pub struct Scope {
    vars: RefCell<HashMap<String, Value>>,
    parent: Option<Env>,
}

impl Scope {
    fn root() -> Env {
        Rc::new(Scope {
            vars: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    fn child(parent: &Env) -> Env {
        Rc::new(Scope {
            vars: RefCell::new(HashMap::new()),
            parent: Some(parent.clone()),
        })
    }

    fn define(&self, name: &str, value: Value) {
        self.vars.borrow_mut().insert(name.to_string(), value);
    }

    fn lookup(&self, name: &str) -> SimResult<Value> {
        if let Some(value) = self.vars.borrow().get(name) {
            return Ok(value.clone());
        }
        match &self.parent {
            Some(parent) => parent.lookup(name),
            None => Err(format!("undefined variable '{}'", name)),
        }
    }

    /// Assign to the nearest declaration, or create a global.
    fn assign(&self, name: &str, value: Value) {
        if let Some(slot) = self.vars.borrow_mut().get_mut(name) {
            *slot = value;
            return;
        }
        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => self.define(name, value),
        }
    }
}

enum Flow {
    Normal,
    Break(Option<String>),
    Continue(Option<String>),
    Return(Value),
}

struct Timer {
    at: u64,
    seq: u64,
    callback: Value,
    args: Vec<Value>,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        (self.at, self.seq) == (other.at, other.seq)
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so the heap pops the earliest timer first
impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.at, other.seq).cmp(&(self.at, self.seq))
    }
}

pub struct Simulator {
    runtime: RuntimeNames,
    globals: Env,
    now: u64,
    seq: u64,
    timers: BinaryHeap<Timer>,
    output: Trace,
    steps: usize,
}

impl Simulator {
    pub fn new() -> Self {
        Self::with_runtime(RuntimeNames::default())
    }

    pub fn with_runtime(runtime: RuntimeNames) -> Self {
        let globals = Scope::root();
        globals.define("print", Value::Builtin(Builtin::Print));
        globals.define("setTimeout", Value::Builtin(Builtin::SetTimeout));
        globals.define(&runtime.new_counter, Value::Builtin(Builtin::NewCounter));
        Self {
            runtime,
            globals,
            now: 0,
            seq: 0,
            timers: BinaryHeap::new(),
            output: Vec::new(),
            steps: 0,
        }
    }

    /// Declare the module's functions, call `entry()` and drain the timers.
    pub fn run(mut self, module: &Module, entry: &str) -> SimResult<Trace> {
        for func in &module.functions {
            let closure = Value::Closure(Rc::new(Closure {
                func: func.clone(),
                env: self.globals.clone(),
            }));
            self.globals.define(func.display_name(), closure);
        }
        let main = self.globals.lookup(entry)?;
        self.call(main, Vec::new())?;

        while let Some(timer) = self.timers.pop() {
            self.now = timer.at;
            self.call(timer.callback, timer.args)?;
        }
        Ok(self.output)
    }

    fn call(&mut self, callee: Value, args: Vec<Value>) -> SimResult<Value> {
        self.steps += 1;
        if self.steps > MAX_STEPS {
            return Err("step limit exceeded".to_string());
        }

        match callee {
            Value::Closure(closure) => {
                let env = Scope::child(&closure.env);
                let mut args = args.into_iter();
                for param in &closure.func.params {
                    env.define(&param.name, args.next().unwrap_or(Value::Null));
                }
                match self.exec_block(&closure.func.body, &env)? {
                    Flow::Return(value) => Ok(value),
                    Flow::Normal => Ok(Value::Null),
                    Flow::Break(_) | Flow::Continue(_) => {
                        Err(format!("jump escaped '{}'", closure.func.display_name()))
                    }
                }
            }
            Value::Builtin(Builtin::Print) => {
                let line = args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(" ");
                self.output.push((self.now, line));
                Ok(Value::Null)
            }
            Value::Builtin(Builtin::SetTimeout) => {
                let mut args = args.into_iter();
                let callback = args.next().ok_or("setTimeout needs a callback")?;
                let delay = match args.next() {
                    Some(Value::Int(ms)) if ms >= 0 => ms as u64,
                    None => 0,
                    Some(_) => return Err("setTimeout delay must be a non-negative int".into()),
                };
                self.seq += 1;
                self.timers.push(Timer {
                    at: self.now + delay,
                    seq: self.seq,
                    callback,
                    args: args.collect(),
                });
                Ok(Value::Null)
            }
            Value::Builtin(Builtin::NewCounter) => {
                Ok(Value::Counter(Rc::new(RefCell::new(Counter::default()))))
            }
            Value::Method(counter, CounterMethod::Defer) => {
                counter.borrow_mut().outstanding += 1;
                Ok(Value::Deferred(Rc::new(Deferred {
                    counter,
                    assign: args.into_iter().next(),
                    fired: Cell::new(false),
                })))
            }
            Value::Method(counter, CounterMethod::Wait) => {
                let k = args.into_iter().next().ok_or("wait needs a continuation")?;
                let ready = {
                    let mut state = counter.borrow_mut();
                    if state.waited {
                        return Err("wait registered twice on one counter".into());
                    }
                    state.waited = true;
                    if state.outstanding == 0 {
                        true
                    } else {
                        state.continuation = Some(k.clone());
                        false
                    }
                };
                if ready {
                    self.call(k, Vec::new())?;
                }
                Ok(Value::Null)
            }
            Value::Deferred(deferred) => {
                if deferred.fired.replace(true) {
                    return Err("deferred callback fired twice".into());
                }
                if let Some(assign) = deferred.assign.clone() {
                    self.call(assign, args)?;
                }
                let resume = {
                    let mut state = deferred.counter.borrow_mut();
                    state.outstanding -= 1;
                    if state.outstanding == 0 {
                        state.continuation.take()
                    } else {
                        None
                    }
                };
                if let Some(k) = resume {
                    self.call(k, Vec::new())?;
                }
                Ok(Value::Null)
            }
            other => Err(format!("'{}' is not callable", other)),
        }
    }

    fn exec_block(&mut self, block: &Block, env: &Env) -> SimResult<Flow> {
        for stmt in &block.statements {
            match self.exec(stmt, env)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&mut self, stmt: &Statement, env: &Env) -> SimResult<Flow> {
        match &stmt.kind {
            StatementKind::Let(decl) => {
                let value = match &decl.init {
                    Some(init) => self.eval(init, env)?,
                    None => Value::Null,
                };
                env.define(&decl.name.name, value);
            }
            StatementKind::Assign(assign) => {
                let value = self.eval(&assign.value, env)?;
                match &assign.target {
                    Expression::Identifier(id) => env.assign(&id.name, value),
                    _ => return Err("only identifiers can be assigned".into()),
                }
            }
            StatementKind::Expression(expr) => {
                self.eval(expr, env)?;
            }
            StatementKind::Return(value) => {
                let value = match value {
                    Some(value) => self.eval(value, env)?,
                    None => Value::Null,
                };
                return Ok(Flow::Return(value));
            }
            StatementKind::Block(block) => return self.exec_block(block, env),
            StatementKind::If(if_stmt) => {
                if self.eval(&if_stmt.condition, env)?.truthy() {
                    return self.exec_block(&if_stmt.then_branch, env);
                } else if let Some(else_branch) = &if_stmt.else_branch {
                    return self.exec_block(else_branch, env);
                }
            }
            StatementKind::Switch(switch) => {
                let value = self.eval(&switch.discriminant, env)?;
                for case in &switch.cases {
                    if self.eval(&case.test, env)?.equals(&value) {
                        return self.exec_block(&case.body, env);
                    }
                }
                if let Some(default) = &switch.default {
                    return self.exec_block(default, env);
                }
            }
            StatementKind::Loop(loop_stmt) => return self.exec_loop(loop_stmt, env),
            StatementKind::Break(jump) => {
                return Ok(Flow::Break(jump.label.as_ref().map(|l| l.name.clone())))
            }
            StatementKind::Continue(jump) => {
                return Ok(Flow::Continue(jump.label.as_ref().map(|l| l.name.clone())))
            }
            StatementKind::Wait(_) => return Err("wait-block reached the simulator".into()),
            StatementKind::Function(func) => {
                let closure = Value::Closure(Rc::new(Closure {
                    func: func.clone(),
                    env: env.clone(),
                }));
                env.define(func.display_name(), closure);
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_loop(&mut self, loop_stmt: &LoopStatement, env: &Env) -> SimResult<Flow> {
        let label = loop_stmt.label.as_ref().map(|l| l.name.as_str());
        let targets = |l: &Option<String>| l.is_none() || l.as_deref() == label;

        if let LoopKind::For { init: Some(init), .. } = &loop_stmt.kind {
            self.exec(init, env)?;
        }
        let mut first = true;
        loop {
            let proceed = match &loop_stmt.kind {
                LoopKind::While { condition } => self.eval(condition, env)?.truthy(),
                LoopKind::DoWhile { condition } => first || self.eval(condition, env)?.truthy(),
                LoopKind::For { test, update, .. } => {
                    if !first {
                        if let Some(update) = update {
                            self.exec(update, env)?;
                        }
                    }
                    match test {
                        Some(test) => self.eval(test, env)?.truthy(),
                        None => true,
                    }
                }
            };
            first = false;
            if !proceed {
                return Ok(Flow::Normal);
            }
            match self.exec_block(&loop_stmt.body, env)? {
                Flow::Normal => {}
                Flow::Break(l) if targets(&l) => return Ok(Flow::Normal),
                Flow::Continue(l) if targets(&l) => {}
                flow => return Ok(flow),
            }
        }
    }

    fn eval(&mut self, expr: &Expression, env: &Env) -> SimResult<Value> {
        match expr {
            Expression::IntLiteral(lit) => Ok(Value::Int(lit.value)),
            Expression::StringLiteral(lit) => Ok(Value::Str(Rc::from(lit.value.as_str()))),
            Expression::BooleanLiteral(lit) => Ok(Value::Bool(lit.value)),
            Expression::NullLiteral(_) => Ok(Value::Null),
            Expression::Identifier(id) => env.lookup(&id.name),
            Expression::Unary(unary) => {
                let operand = self.eval(&unary.operand, env)?;
                match (unary.operator, operand) {
                    (UnaryOperator::Not, v) => Ok(Value::Bool(!v.truthy())),
                    (UnaryOperator::Minus, Value::Int(i)) => Ok(Value::Int(-i)),
                    (UnaryOperator::Minus, v) => Err(format!("cannot negate {}", v)),
                }
            }
            Expression::Binary(bin) => self.eval_binary(bin, env),
            Expression::Call(call) => {
                let callee = self.eval(&call.callee, env)?;
                let args = call
                    .arguments
                    .iter()
                    .map(|arg| self.eval(arg, env))
                    .collect::<SimResult<Vec<_>>>()?;
                self.call(callee, args)
            }
            Expression::Member(member) => match self.eval(&member.object, env)? {
                Value::Counter(counter) if member.property.name == self.runtime.defer => {
                    Ok(Value::Method(counter, CounterMethod::Defer))
                }
                Value::Counter(counter) if member.property.name == self.runtime.wait => {
                    Ok(Value::Method(counter, CounterMethod::Wait))
                }
                other => Err(format!("no property '{}' on {}", member.property.name, other)),
            },
            Expression::Function(func) => Ok(Value::Closure(Rc::new(Closure {
                func: (**func).clone(),
                env: env.clone(),
            }))),
            Expression::Defer(_) => Err("defer reached the simulator".into()),
        }
    }

    fn eval_binary(&mut self, bin: &BinaryExpression, env: &Env) -> SimResult<Value> {
        let left = self.eval(&bin.left, env)?;
        match bin.operator {
            BinaryOperator::And if !left.truthy() => return Ok(left),
            BinaryOperator::Or if left.truthy() => return Ok(left),
            BinaryOperator::And | BinaryOperator::Or => return self.eval(&bin.right, env),
            _ => {}
        }
        let right = self.eval(&bin.right, env)?;

        let value = match (bin.operator, &left, &right) {
            (BinaryOperator::Equal, l, r) => Value::Bool(l.equals(r)),
            (BinaryOperator::NotEqual, l, r) => Value::Bool(!l.equals(r)),
            (BinaryOperator::Add, Value::Int(a), Value::Int(b)) => Value::Int(a + b),
            (BinaryOperator::Add, l, r) => Value::Str(Rc::from(format!("{}{}", l, r).as_str())),
            (op, Value::Int(a), Value::Int(b)) => match op {
                BinaryOperator::Subtract => Value::Int(a - b),
                BinaryOperator::Multiply => Value::Int(a * b),
                BinaryOperator::Divide if *b != 0 => Value::Int(a / b),
                BinaryOperator::Modulo if *b != 0 => Value::Int(a % b),
                BinaryOperator::Less => Value::Bool(a < b),
                BinaryOperator::LessEqual => Value::Bool(a <= b),
                BinaryOperator::Greater => Value::Bool(a > b),
                BinaryOperator::GreaterEqual => Value::Bool(a >= b),
                _ => return Err(format!("invalid operands {} {} {}", a, op, b)),
            },
            (op, l, r) => return Err(format!("invalid operands {} {} {}", l, op, r)),
        };
        Ok(value)
    }
}
