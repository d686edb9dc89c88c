//! Named implementations for common procs.
//!
//! A builtin adapts to the shape of the proc it implements: it reads its
//! arguments from the proc's input slots in declaration order and writes its
//! result to the first slot of the first output flow that has slots. Builtins
//! that can fail (`parse_int`) continue on the proc's next declared flow when
//! there is one.

use std::sync::Arc;

use flowsynth_core::id::{FlowId, ProcId};
use flowsynth_core::proc_def::Proc;

use super::error::{BridgeError, RuntimeError};
use super::impls::{ProcImpl, ProcOutcome};
use super::value::{Value, ValueMap};

/// Every builtin name [`resolve`] accepts.
pub const NAMES: &[&str] = &[
    "identity",
    "to_string",
    "parse_int",
    "increment",
    "add",
    "negate",
    "concat",
    "length",
    "upper",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Identity,
    ToString,
    ParseInt,
    Increment,
    Add,
    Negate,
    Concat,
    Length,
    Upper,
}

impl Op {
    fn from_name(name: &str) -> Option<Op> {
        Some(match name {
            "identity" => Op::Identity,
            "to_string" => Op::ToString,
            "parse_int" => Op::ParseInt,
            "increment" => Op::Increment,
            "add" => Op::Add,
            "negate" => Op::Negate,
            "concat" => Op::Concat,
            "length" => Op::Length,
            "upper" => Op::Upper,
            _ => return None,
        })
    }

    fn arity(self) -> usize {
        match self {
            Op::Add | Op::Concat => 2,
            _ => 1,
        }
    }
}

/// Binds the builtin `name` to the shape of `proc`.
pub fn resolve<T>(name: &str, proc_id: &ProcId, proc: &Proc<T>) -> Result<Arc<dyn ProcImpl>, BridgeError> {
    let op = Op::from_name(name).ok_or_else(|| BridgeError::UnknownBuiltin {
        name: name.to_string(),
    })?;
    let incompatible = |reason: String| BridgeError::IncompatibleBuiltin {
        name: name.to_string(),
        proc: proc_id.clone(),
        reason,
    };

    let inputs: Vec<String> = proc.inputs.keys().take(op.arity()).cloned().collect();
    if inputs.len() < op.arity() {
        return Err(incompatible(format!(
            "needs {} input slot(s), proc declares {}",
            op.arity(),
            proc.inputs.len()
        )));
    }

    let (index, flow, slot) = proc
        .output_flows
        .iter()
        .enumerate()
        .find_map(|(i, (flow, slots))| slots.keys().next().map(|slot| (i, flow.clone(), slot.clone())))
        .ok_or_else(|| incompatible("no output flow has a slot".to_string()))?;
    let failure = proc
        .output_flows
        .keys()
        .enumerate()
        .find(|(i, _)| *i != index)
        .map(|(_, flow)| flow.clone());

    Ok(Arc::new(Builtin {
        op,
        inputs,
        flow,
        slot,
        failure,
    }))
}

struct Builtin {
    op: Op,
    inputs: Vec<String>,
    flow: FlowId,
    slot: String,
    failure: Option<FlowId>,
}

impl Builtin {
    fn arg<'a>(&self, args: &'a ValueMap, i: usize) -> Result<&'a Value, RuntimeError> {
        let slot = &self.inputs[i];
        args.get(slot).ok_or_else(|| RuntimeError::InvalidArgument {
            slot: slot.clone(),
            expected: "a value".into(),
            got: "nothing".into(),
        })
    }

    fn int(&self, args: &ValueMap, i: usize) -> Result<i64, RuntimeError> {
        let value = self.arg(args, i)?;
        value.as_int().ok_or_else(|| self.mismatch(i, "Int", value))
    }

    fn str<'a>(&self, args: &'a ValueMap, i: usize) -> Result<&'a str, RuntimeError> {
        let value = self.arg(args, i)?;
        value.as_str().ok_or_else(|| self.mismatch(i, "Str", value))
    }

    fn mismatch(&self, i: usize, expected: &str, got: &Value) -> RuntimeError {
        RuntimeError::InvalidArgument {
            slot: self.inputs[i].clone(),
            expected: expected.to_string(),
            got: got.type_name().to_string(),
        }
    }

    fn done(&self, value: impl Into<Value>) -> Result<ProcOutcome, RuntimeError> {
        Ok(ProcOutcome::new(self.flow.clone()).with(&self.slot, value))
    }
}

fn overflow() -> RuntimeError {
    RuntimeError::Fault {
        message: "integer overflow".into(),
    }
}

impl ProcImpl for Builtin {
    fn invoke(&self, args: &ValueMap) -> Result<ProcOutcome, RuntimeError> {
        match self.op {
            Op::Identity => self.done(self.arg(args, 0)?.clone()),
            Op::ToString => self.done(self.arg(args, 0)?.to_string()),
            Op::ParseInt => {
                let text = self.str(args, 0)?;
                match text.trim().parse::<i64>() {
                    Ok(v) => self.done(v),
                    Err(err) => match &self.failure {
                        Some(flow) => Ok(ProcOutcome::new(flow.clone())),
                        None => Err(RuntimeError::Fault {
                            message: format!("cannot parse '{text}': {err}"),
                        }),
                    },
                }
            }
            Op::Increment => self.done(self.int(args, 0)?.checked_add(1).ok_or_else(overflow)?),
            Op::Add => {
                let sum = self.int(args, 0)?.checked_add(self.int(args, 1)?);
                self.done(sum.ok_or_else(overflow)?)
            }
            Op::Negate => self.done(self.int(args, 0)?.checked_neg().ok_or_else(overflow)?),
            Op::Concat => {
                let joined = format!("{}{}", self.arg(args, 0)?, self.arg(args, 1)?);
                self.done(joined)
            }
            Op::Length => {
                let len = match self.arg(args, 0)? {
                    Value::Str(s) => s.chars().count(),
                    Value::List(items) => items.len(),
                    other => return Err(self.mismatch(0, "Str or List", other)),
                };
                self.done(len as i64)
            }
            Op::Upper => self.done(self.str(args, 0)?.to_uppercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowsynth_core::nominal::TypeName;

    fn t(name: &str) -> TypeName {
        TypeName::new(name)
    }

    fn args(pairs: &[(&str, Value)]) -> ValueMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn to_string_follows_proc_shape() {
        let proc = Proc::new(true)
            .input("number", t("Int"))
            .output("ok", "text", t("String"));
        let imp = resolve("to_string", &"toString".into(), &proc).unwrap();
        let outcome = imp.invoke(&args(&[("number", Value::Int(5))])).unwrap();
        assert_eq!(outcome, ProcOutcome::new("ok").with("text", "5"));
    }

    #[test]
    fn parse_int_fails_over_to_next_flow() {
        let proc = Proc::new(true)
            .input("text", t("String"))
            .output("ok", "value", t("Int"))
            .flow("err");
        let imp = resolve("parse_int", &"parse".into(), &proc).unwrap();
        assert_eq!(
            imp.invoke(&args(&[("text", " 42 ".into())])).unwrap(),
            ProcOutcome::new("ok").with("value", 42i64)
        );
        assert_eq!(imp.invoke(&args(&[("text", "x".into())])).unwrap(), ProcOutcome::new("err"));
    }

    #[test]
    fn add_needs_two_inputs() {
        let proc = Proc::new(true).input("a", t("Int")).output("ok", "sum", t("Int"));
        let err = resolve("add", &"add".into(), &proc).err().unwrap();
        assert_eq!(err.to_string(), "builtin 'add' cannot implement proc 'add': needs 2 input slot(s), proc declares 1");

        let proc = proc.input("b", t("Int"));
        let imp = resolve("add", &"add".into(), &proc).unwrap();
        let outcome = imp.invoke(&args(&[("a", Value::Int(2)), ("b", Value::Int(3))])).unwrap();
        assert_eq!(outcome.values["sum"], Value::Int(5));
    }

    #[test]
    fn wrong_argument_kind_is_a_fault() {
        let proc = Proc::new(true).input("s", t("String")).output("ok", "s", t("String"));
        let imp = resolve("upper", &"upper".into(), &proc).unwrap();
        let err = imp.invoke(&args(&[("s", Value::Int(1))])).unwrap_err();
        assert_eq!(err.to_string(), "invalid argument 's': expected Str, got Int");
        assert!(matches!(
            resolve("nope", &"x".into(), &proc).err(),
            Some(BridgeError::UnknownBuiltin { .. })
        ));
    }
}
