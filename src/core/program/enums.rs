//! Enum member constant evaluation.
//!
//! Follows TypeScript's constant enum rules: members without an initializer
//! auto-increment from 0 (or from the previous numeric member), and an
//! initializer is constant when it is built from literals, earlier members of
//! the same enum, and the arithmetic / bitwise / concatenation operators.
//! Anything else (function calls, references to other declarations) has no
//! constant value.

use std::collections::HashMap;

use swc_ecma_ast::{BinaryOp, Expr, Lit, MemberProp, TsEnumDecl, TsEnumMemberId, UnaryOp};

#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Number(f64),
    String(String),
}

impl ConstValue {
    fn to_js_string(&self) -> String {
        match self {
            ConstValue::String(s) => s.clone(),
            ConstValue::Number(n) if n.is_finite() && n.fract() == 0.0 => {
                format!("{}", *n as i64)
            }
            ConstValue::Number(n) => n.to_string(),
        }
    }
}

pub fn member_name(id: &TsEnumMemberId) -> Option<String> {
    match id {
        TsEnumMemberId::Ident(ident) => Some(ident.sym.to_string()),
        TsEnumMemberId::Str(s) => s.value.as_str().map(str::to_string),
    }
}

/// Constant value of every member of `decl`, in declaration order.
pub fn evaluate_enum(decl: &TsEnumDecl) -> Vec<Option<ConstValue>> {
    let mut values = Vec::with_capacity(decl.members.len());
    let mut known: HashMap<String, ConstValue> = HashMap::new();
    let mut next_auto = Some(0.0);

    for member in &decl.members {
        let value = match &member.init {
            None => next_auto.map(ConstValue::Number),
            Some(init) => evaluate(init, decl.id.sym.as_str(), &known),
        };

        next_auto = match &value {
            Some(ConstValue::Number(n)) => Some(n + 1.0),
            _ => None,
        };

        if let (Some(value), Some(name)) = (&value, member_name(&member.id)) {
            known.insert(name, value.clone());
        }
        values.push(value);
    }

    values
}

fn evaluate(
    expr: &Expr,
    enum_name: &str,
    known: &HashMap<String, ConstValue>,
) -> Option<ConstValue> {
    match expr {
        Expr::Lit(Lit::Num(n)) => Some(ConstValue::Number(n.value)),
        Expr::Lit(Lit::Str(s)) => s.value.as_str().map(|s| ConstValue::String(s.to_string())),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => tpl
            .quasis
            .first()
            .and_then(|q| q.cooked.as_ref())
            .and_then(|s| s.as_str())
            .map(|s| ConstValue::String(s.to_string())),
        Expr::Paren(paren) => evaluate(&paren.expr, enum_name, known),
        Expr::Ident(ident) => known.get(ident.sym.as_str()).cloned(),
        // `Enum.Member` inside its own enum
        Expr::Member(member) => match (&*member.obj, &member.prop) {
            (Expr::Ident(obj), MemberProp::Ident(prop)) if obj.sym.as_str() == enum_name => {
                known.get(prop.sym.as_str()).cloned()
            }
            _ => None,
        },
        Expr::Unary(unary) => {
            let ConstValue::Number(n) = evaluate(&unary.arg, enum_name, known)? else {
                return None;
            };
            match unary.op {
                UnaryOp::Minus => Some(ConstValue::Number(-n)),
                UnaryOp::Plus => Some(ConstValue::Number(n)),
                UnaryOp::Tilde => Some(ConstValue::Number(f64::from(!to_int32(n)))),
                _ => None,
            }
        }
        Expr::Bin(bin) => {
            let left = evaluate(&bin.left, enum_name, known)?;
            let right = evaluate(&bin.right, enum_name, known)?;
            evaluate_binary(bin.op, left, right)
        }
        _ => None,
    }
}

fn evaluate_binary(op: BinaryOp, left: ConstValue, right: ConstValue) -> Option<ConstValue> {
    let (l, r) = match (&left, &right) {
        (ConstValue::Number(l), ConstValue::Number(r)) => (*l, *r),
        _ if op == BinaryOp::Add => {
            return Some(ConstValue::String(
                left.to_js_string() + right.to_js_string().as_str(),
            ));
        }
        _ => return None,
    };

    let value = match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div => l / r,
        BinaryOp::Mod => l % r,
        BinaryOp::Exp => l.powf(r),
        BinaryOp::BitOr => f64::from(to_int32(l) | to_int32(r)),
        BinaryOp::BitAnd => f64::from(to_int32(l) & to_int32(r)),
        BinaryOp::BitXor => f64::from(to_int32(l) ^ to_int32(r)),
        BinaryOp::LShift => f64::from(to_int32(l).wrapping_shl(to_uint32(r) & 31)),
        BinaryOp::RShift => f64::from(to_int32(l).wrapping_shr(to_uint32(r) & 31)),
        BinaryOp::ZeroFillRShift => f64::from(to_uint32(l).wrapping_shr(to_uint32(r) & 31)),
        _ => return None,
    };

    value.is_finite().then_some(ConstValue::Number(value))
}

fn to_int32(n: f64) -> i32 {
    if n.is_finite() { n.trunc() as i64 as i32 } else { 0 }
}

fn to_uint32(n: f64) -> u32 {
    to_int32(n) as u32
}
