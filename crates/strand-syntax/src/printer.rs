//! Pretty printer for the Strand surface language.
//!
//! Output re-parses to a tree of the same shape (ids aside), which the tests
//! of the transform rely on when comparing rotated code textually.

use crate::ast::*;
use crate::parser::precedence::{operator_precedence, Precedence};

const INDENT: &str = "    ";

/// Print a whole module, functions separated by a blank line.
pub fn print_module(module: &Module) -> String {
    let mut printer = Printer::new();
    for (i, func) in module.functions.iter().enumerate() {
        if i > 0 {
            printer.out.push('\n');
        }
        printer.function(func);
        printer.out.push('\n');
    }
    printer.out
}

pub fn print_function(func: &Function) -> String {
    let mut printer = Printer::new();
    printer.function(func);
    printer.out
}

/// Print the statements of a block, one per line, without the braces.
pub fn print_block(block: &Block) -> String {
    let mut printer = Printer::new();
    for stmt in &block.statements {
        printer.statement(stmt);
    }
    printer.out
}

pub fn print_statement(stmt: &Statement) -> String {
    let mut printer = Printer::new();
    printer.statement(stmt);
    printer.out
}

pub fn print_expression(expr: &Expression) -> String {
    let mut printer = Printer::new();
    printer.expression(expr);
    printer.out
}

struct Printer {
    out: String,
    level: usize,
}

impl Printer {
    fn new() -> Self {
        Self {
            out: String::new(),
            level: 0,
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.level {
            self.out.push_str(INDENT);
        }
    }

    fn function(&mut self, func: &Function) {
        self.out.push_str("function ");
        if let Some(name) = &func.name {
            self.out.push_str(&name.name);
        }
        self.out.push('(');
        for (i, param) in func.params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(&param.name);
        }
        self.out.push_str(") ");
        self.braced(&func.body);
    }

    /// `{ ... }` starting at the current column, closing brace indented.
    fn braced(&mut self, block: &Block) {
        if block.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push_str("{\n");
        self.level += 1;
        for stmt in &block.statements {
            self.statement(stmt);
        }
        self.level -= 1;
        self.indent();
        self.out.push('}');
    }

    fn statement(&mut self, stmt: &Statement) {
        self.indent();
        self.statement_inline(stmt);
        self.out.push('\n');
    }

    fn statement_inline(&mut self, stmt: &Statement) {
        match &stmt.kind {
            StatementKind::Let(_) | StatementKind::Assign(_) | StatementKind::Expression(_) => {
                self.simple(stmt);
                self.out.push(';');
            }
            StatementKind::Return(value) => {
                self.out.push_str("return");
                if let Some(value) = value {
                    self.out.push(' ');
                    self.expression(value);
                }
                self.out.push(';');
            }
            StatementKind::Block(block) => self.braced(block),
            StatementKind::Wait(block) => {
                self.out.push_str("wait ");
                self.braced(block);
            }
            StatementKind::If(stmt) => self.if_statement(stmt),
            StatementKind::Switch(stmt) => {
                self.out.push_str("switch (");
                self.expression(&stmt.discriminant);
                self.out.push_str(") {\n");
                self.level += 1;
                for case in &stmt.cases {
                    self.indent();
                    self.out.push_str("case ");
                    self.expression(&case.test);
                    self.out.push_str(":\n");
                    self.arm(&case.body);
                }
                if let Some(default) = &stmt.default {
                    self.indent();
                    self.out.push_str("default:\n");
                    self.arm(default);
                }
                self.level -= 1;
                self.indent();
                self.out.push('}');
            }
            StatementKind::Loop(stmt) => self.loop_statement(stmt),
            StatementKind::Break(jump) => self.jump("break", jump),
            StatementKind::Continue(jump) => self.jump("continue", jump),
            StatementKind::Function(func) => self.function(func),
        }
    }

    /// Let, assignment or expression without the trailing `;`.
    fn simple(&mut self, stmt: &Statement) {
        match &stmt.kind {
            StatementKind::Let(decl) => {
                self.out.push_str("let ");
                self.out.push_str(&decl.name.name);
                if let Some(init) = &decl.init {
                    self.out.push_str(" = ");
                    self.expression(init);
                }
            }
            StatementKind::Assign(assign) => {
                self.expression(&assign.target);
                self.out.push_str(" = ");
                self.expression(&assign.value);
            }
            StatementKind::Expression(expr) => self.expression(expr),
            _ => self.statement_inline(stmt),
        }
    }

    fn arm(&mut self, body: &Block) {
        self.level += 1;
        for stmt in &body.statements {
            self.statement(stmt);
        }
        self.level -= 1;
    }

    fn if_statement(&mut self, stmt: &IfStatement) {
        self.out.push_str("if (");
        self.expression(&stmt.condition);
        self.out.push_str(") ");
        self.braced(&stmt.then_branch);
        if let Some(else_branch) = &stmt.else_branch {
            self.out.push_str(" else ");
            match else_branch.statements.as_slice() {
                [Statement {
                    kind: StatementKind::If(nested),
                    ..
                }] => self.if_statement(nested),
                _ => self.braced(else_branch),
            }
        }
    }

    fn loop_statement(&mut self, stmt: &LoopStatement) {
        if let Some(label) = &stmt.label {
            self.out.push_str(&label.name);
            self.out.push_str(": ");
        }
        match &stmt.kind {
            LoopKind::While { condition } => {
                self.out.push_str("while (");
                self.expression(condition);
                self.out.push_str(") ");
                self.braced(&stmt.body);
            }
            LoopKind::DoWhile { condition } => {
                self.out.push_str("do ");
                self.braced(&stmt.body);
                self.out.push_str(" while (");
                self.expression(condition);
                self.out.push_str(");");
            }
            LoopKind::For { init, test, update } => {
                self.out.push_str("for (");
                if let Some(init) = init {
                    self.simple(init);
                }
                self.out.push(';');
                if let Some(test) = test {
                    self.out.push(' ');
                    self.expression(test);
                }
                self.out.push(';');
                if let Some(update) = update {
                    self.out.push(' ');
                    self.simple(update);
                }
                self.out.push_str(") ");
                self.braced(&stmt.body);
            }
        }
    }

    fn jump(&mut self, keyword: &str, jump: &JumpStatement) {
        self.out.push_str(keyword);
        if let Some(label) = &jump.label {
            self.out.push(' ');
            self.out.push_str(&label.name);
        }
        self.out.push(';');
    }

    fn expression(&mut self, expr: &Expression) {
        match expr {
            Expression::IntLiteral(lit) => self.out.push_str(&lit.value.to_string()),
            Expression::StringLiteral(lit) => {
                self.out.push('"');
                for c in lit.value.chars() {
                    match c {
                        '"' => self.out.push_str("\\\""),
                        '\\' => self.out.push_str("\\\\"),
                        '\n' => self.out.push_str("\\n"),
                        '\r' => self.out.push_str("\\r"),
                        '\t' => self.out.push_str("\\t"),
                        c => self.out.push(c),
                    }
                }
                self.out.push('"');
            }
            Expression::BooleanLiteral(lit) => {
                self.out.push_str(if lit.value { "true" } else { "false" })
            }
            Expression::NullLiteral(_) => self.out.push_str("null"),
            Expression::Identifier(id) => self.out.push_str(&id.name),
            Expression::Unary(unary) => {
                self.out.push(match unary.operator {
                    UnaryOperator::Not => '!',
                    UnaryOperator::Minus => '-',
                });
                self.operand(&unary.operand, Precedence::Unary);
            }
            Expression::Binary(bin) => {
                let prec = operator_precedence(bin.operator);
                self.operand(&bin.left, prec);
                self.out.push(' ');
                self.out.push_str(bin.operator.symbol());
                self.out.push(' ');
                // Left-associative: an equal-precedence right operand needs parens
                self.operand(&bin.right, prec.next_level());
            }
            Expression::Call(call) => {
                self.postfix_target(&call.callee);
                self.out.push('(');
                for (i, arg) in call.arguments.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expression(arg);
                }
                self.out.push(')');
            }
            Expression::Member(member) => {
                self.postfix_target(&member.object);
                self.out.push('.');
                self.out.push_str(&member.property.name);
            }
            Expression::Function(func) => self.function(func),
            Expression::Defer(defer) => {
                self.out.push_str("defer(");
                for (i, binding) in defer.bindings.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.out.push_str(&binding.name);
                }
                self.out.push(')');
            }
        }
    }

    fn operand(&mut self, expr: &Expression, min: Precedence) {
        let needs_parens = match expr {
            Expression::Binary(bin) => operator_precedence(bin.operator) < min,
            _ => false,
        };
        if needs_parens {
            self.out.push('(');
            self.expression(expr);
            self.out.push(')');
        } else {
            self.expression(expr);
        }
    }

    fn postfix_target(&mut self, expr: &Expression) {
        match expr {
            Expression::Binary(_) | Expression::Unary(_) | Expression::Function(_) => {
                self.out.push('(');
                self.expression(expr);
                self.out.push(')');
            }
            _ => self.expression(expr),
        }
    }
}
