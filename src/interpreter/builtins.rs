/*
 * ==========================================================================
 * MINIPAR - Parallel blocks & network channels
 * ==========================================================================
 *
 * License:
 * This file is part of the MINIPAR programming language project.
 *
 * MINIPAR is dual-licensed under the terms of:
 *   - The MIT license
 *   - The Apache License, Version 2.0
 *
 * You may choose either license to govern your use of this software.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under these licenses is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *
 * ==========================================================================
 */


use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;

use crate::error::{MiniparError, Result};
use crate::interpreter::channels;
use crate::interpreter::display::{value_to_json, value_to_string};
use crate::interpreter::environment::VarTable;
use crate::interpreter::helpers::{as_int, as_str, is_truthy};
use crate::interpreter::Runner;
use crate::value::{lock, Value};

/// Signature shared by every native function. Arguments arrive evaluated,
/// the receiver of a dotted call first.
pub type Builtin = fn(&Runner, &Arc<VarTable>, Vec<Value>) -> Result<Value>;

/// Resolves a built-in by name.
///
/// The set of names matches the signature table the parser seeds its root
/// scope with, so every name the checker accepts as a built-in resolves
/// here.
pub fn lookup(name: &str) -> Option<Builtin> {
    let builtin: Builtin = match name {
        // ---------------------------------------------------------------------
        // Console
        // ---------------------------------------------------------------------
        "print" => builtin_print,
        "input" => builtin_input,
        "sleep" => builtin_sleep,
        "debug" => builtin_debug,

        // ---------------------------------------------------------------------
        // Conversions
        // ---------------------------------------------------------------------
        "to_number" => builtin_to_number,
        "to_string" => builtin_to_string,
        "to_bool" => builtin_to_bool,

        // ---------------------------------------------------------------------
        // Channels
        // ---------------------------------------------------------------------
        "send" => builtin_send,
        "close" => builtin_close,
        "listen" => builtin_listen,

        // ---------------------------------------------------------------------
        // Collections & Strings
        // ---------------------------------------------------------------------
        "len" => builtin_len,
        "isalpha" => builtin_isalpha,
        "isnum" => builtin_isnum,
        "sum" => builtin_sum,
        "intersection" => builtin_intersection,
        "contains" => builtin_contains,
        "isEmpty" => builtin_is_empty,
        "append" => builtin_append,
        "sort" => builtin_sort,
        "strip" => builtin_strip,
        "lower" => builtin_lower,
        "keys" => builtin_keys,
        "split" => builtin_split,

        // ---------------------------------------------------------------------
        // Math
        // ---------------------------------------------------------------------
        "pow" => builtin_pow,
        "sqrt" => builtin_sqrt,
        "exp" => builtin_exp,
        "range" => builtin_range,
        "random" => builtin_random,

        _ => return None,
    };
    Some(builtin)
}

/// Rejects calls whose argument count falls outside `min..=max`.
fn arity(name: &str, args: &[Value], min: usize, max: usize) -> Result<()> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }
    let expected = if min == max {
        min.to_string()
    } else {
        format!("{min} to {max}")
    };
    Err(MiniparError::runtime(format!(
        "`{name}` expects {expected} argument(s), got {}",
        args.len()
    )))
}

fn as_number(value: &Value, what: &str) -> Result<f64> {
    value.as_f64().ok_or_else(|| {
        MiniparError::runtime(format!("{what} must be a NUMBER, found {}", value.type_name()))
    })
}

/* ============================================================================
 * Console
 * ============================================================================
 */

/// `print(a, b, ...)`: space-joined display forms followed by a newline.
fn builtin_print(runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    let line: Vec<String> = args.iter().map(value_to_string).collect();
    runner.console.write(&format!("{}\n", line.join(" ")))?;
    Ok(Value::Void)
}

/// `input(prompt?)`: writes the prompt without a newline and reads one line.
fn builtin_input(runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("input", &args, 0, 1)?;
    if let Some(prompt) = args.first() {
        runner.console.write(&value_to_string(prompt))?;
    }
    runner
        .console
        .read_line()?
        .map(Value::String)
        .ok_or_else(|| MiniparError::runtime("`input` reached the end of input"))
}

/// `sleep(seconds)`
fn builtin_sleep(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("sleep", &args, 1, 1)?;
    let seconds = as_number(&args[0], "sleep duration")?;
    let duration = Duration::try_from_secs_f64(seconds)
        .map_err(|_| MiniparError::runtime(format!("invalid sleep duration {seconds}")))?;
    thread::sleep(duration);
    Ok(Value::Void)
}

#[derive(Serialize)]
struct ScopeFrame {
    depth: usize,
    bindings: BTreeMap<String, serde_json::Value>,
}

/// `debug()` prints the visible scope frames as JSON, innermost first.
/// `debug(a, b, ...)` prints its arguments as a JSON array.
fn builtin_debug(runner: &Runner, env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    let json = if args.is_empty() {
        let frames: Vec<ScopeFrame> = env
            .frames()
            .into_iter()
            .zip((0..=env.depth()).rev())
            .map(|(bindings, depth)| ScopeFrame {
                depth,
                bindings: bindings
                    .iter()
                    .map(|(name, value)| (name.clone(), value_to_json(value)))
                    .collect(),
            })
            .collect();
        serde_json::to_string(&frames)
    } else {
        let values: Vec<serde_json::Value> = args.iter().map(value_to_json).collect();
        serde_json::to_string(&values)
    }
    .map_err(|e| MiniparError::runtime(format!("cannot render debug output: {e}")))?;

    runner.console.write(&format!("{json}\n"))?;
    Ok(Value::Void)
}

/* ============================================================================
 * Conversions
 * ============================================================================
 */

/// `to_number(x)`: numbers pass through, strings parse as an integer first
/// and then as a float, booleans become `1`/`0`.
fn builtin_to_number(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("to_number", &args, 1, 1)?;
    match &args[0] {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::String(s) => {
            let text = s.trim();
            text.parse::<i64>()
                .map(Value::Int)
                .or_else(|_| text.parse::<f64>().map(Value::Float))
                .map_err(|_| MiniparError::runtime(format!("cannot convert \"{s}\" to a number")))
        }
        other => Err(MiniparError::runtime(format!(
            "cannot convert a {} to a number",
            other.type_name()
        ))),
    }
}

fn builtin_to_string(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("to_string", &args, 1, 1)?;
    Ok(Value::String(value_to_string(&args[0])))
}

fn builtin_to_bool(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("to_bool", &args, 1, 1)?;
    Ok(Value::Bool(is_truthy(&args[0])))
}

/* ============================================================================
 * Channels
 * ============================================================================
 */

/// `send(client, data)`: returns the server's reply.
fn builtin_send(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("send", &args, 2, 2)?;
    match &args[0] {
        Value::Client(channel) => {
            let reply = channel.send(&value_to_string(&args[1]))?;
            Ok(Value::String(reply))
        }
        other => Err(MiniparError::runtime(format!(
            "`send` needs a C_CHANNEL, found {}",
            other.type_name()
        ))),
    }
}

/// `close(client)`
fn builtin_close(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("close", &args, 1, 1)?;
    match &args[0] {
        Value::Client(channel) => {
            channel.close();
            Ok(Value::Void)
        }
        other => Err(MiniparError::runtime(format!(
            "`close` needs a C_CHANNEL, found {}",
            other.type_name()
        ))),
    }
}

/// `listen(server)`: binds now, serves in the background.
fn builtin_listen(runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("listen", &args, 1, 1)?;
    match &args[0] {
        Value::Server(channel) => {
            channels::listen(runner, channel)?;
            Ok(Value::Void)
        }
        other => Err(MiniparError::runtime(format!(
            "`listen` needs an S_CHANNEL, found {}",
            other.type_name()
        ))),
    }
}

/* ============================================================================
 * Collections & Strings
 * ============================================================================
 */

fn builtin_len(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("len", &args, 1, 1)?;
    let len = match &args[0] {
        Value::String(s) => s.chars().count(),
        Value::List(values) => lock(values).len(),
        Value::Dict(entries) => lock(entries).len(),
        other => {
            return Err(MiniparError::runtime(format!(
                "a {} has no length",
                other.type_name()
            )))
        }
    };
    Ok(Value::Int(len as i64))
}

/// `isalpha(x)`: the display form is non-empty and purely alphabetic.
fn builtin_isalpha(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("isalpha", &args, 1, 1)?;
    let text = value_to_string(&args[0]);
    Ok(Value::Bool(!text.is_empty() && text.chars().all(char::is_alphabetic)))
}

/// `isnum(x)`: the display form parses as a number.
fn builtin_isnum(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("isnum", &args, 1, 1)?;
    let text = value_to_string(&args[0]);
    Ok(Value::Bool(text.trim().parse::<f64>().is_ok()))
}

/// `sum(list)`: integral while every element is an integer.
fn builtin_sum(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("sum", &args, 1, 1)?;
    let values = match &args[0] {
        Value::List(values) => lock(values).clone(),
        other => {
            return Err(MiniparError::runtime(format!(
                "`sum` needs a LIST, found {}",
                other.type_name()
            )))
        }
    };

    let mut total = Value::Int(0);
    for value in &values {
        total = match (&total, value) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_add(*b)
                .map(Value::Int)
                .ok_or_else(|| MiniparError::runtime("integer overflow"))?,
            (a, b) => Value::Float(
                as_number(a, "sum element")? + as_number(b, "sum element")?,
            ),
        };
    }
    Ok(total)
}

/// `intersection(a, b)`: elements of `a` also found in `b`, first
/// occurrences only, in `a`'s order.
fn builtin_intersection(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("intersection", &args, 2, 2)?;
    match (&args[0], &args[1]) {
        (Value::List(a), Value::List(b)) => {
            let a = lock(a).clone();
            let b = lock(b).clone();
            let mut common: Vec<Value> = Vec::new();
            for value in a {
                if b.contains(&value) && !common.contains(&value) {
                    common.push(value);
                }
            }
            Ok(Value::list(common))
        }
        (a, b) => Err(MiniparError::runtime(format!(
            "`intersection` needs two LISTs, found {} and {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

/// `contains(container, item)`: dict key, list element or substring.
fn builtin_contains(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("contains", &args, 2, 2)?;
    let found = match &args[0] {
        Value::Dict(entries) => {
            let key = value_to_string(&args[1]);
            lock(entries).contains_key(&key)
        }
        Value::List(values) => {
            let items = lock(values).clone();
            let mut found = false;
            for item in &items {
                if item.equals(&args[1])? {
                    found = true;
                    break;
                }
            }
            found
        }
        Value::String(s) => s.contains(as_str(&args[1], "substring")?),
        other => {
            return Err(MiniparError::runtime(format!(
                "`contains` cannot search a {}",
                other.type_name()
            )))
        }
    };
    Ok(Value::Bool(found))
}

fn builtin_is_empty(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("isEmpty", &args, 1, 1)?;
    let empty = match &args[0] {
        Value::String(s) => s.is_empty(),
        Value::List(values) => lock(values).is_empty(),
        Value::Dict(entries) => lock(entries).is_empty(),
        other => {
            return Err(MiniparError::runtime(format!(
                "a {} has no length",
                other.type_name()
            )))
        }
    };
    Ok(Value::Bool(empty))
}

/// `append(list, value)`: mutates the shared list in place.
fn builtin_append(_runner: &Runner, _env: &Arc<VarTable>, mut args: Vec<Value>) -> Result<Value> {
    arity("append", &args, 2, 2)?;
    let value = args.remove(1);
    match &args[0] {
        Value::List(values) => {
            lock(values).push(value);
            Ok(Value::Void)
        }
        other => Err(MiniparError::runtime(format!(
            "`append` needs a LIST, found {}",
            other.type_name()
        ))),
    }
}

/// `sort(list)`: in place, numbers or strings only.
fn builtin_sort(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("sort", &args, 1, 1)?;
    let Value::List(values) = &args[0] else {
        return Err(MiniparError::runtime(format!(
            "`sort` needs a LIST, found {}",
            args[0].type_name()
        )));
    };

    let mut sorted = lock(values).clone();
    let comparable = sorted.iter().all(Value::is_number)
        || sorted.iter().all(|v| matches!(v, Value::String(_)));
    if !comparable {
        return Err(MiniparError::runtime(
            "`sort` needs a list of numbers or a list of strings",
        ));
    }

    sorted.sort_by(|a, b| match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (a, b) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
    });
    *lock(values) = sorted;
    Ok(Value::Void)
}

fn builtin_strip(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("strip", &args, 1, 1)?;
    Ok(Value::String(value_to_string(&args[0]).trim().to_string()))
}

fn builtin_lower(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("lower", &args, 1, 1)?;
    Ok(Value::String(value_to_string(&args[0]).to_lowercase()))
}

/// `keys(dict)`: the keys in iteration order.
fn builtin_keys(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("keys", &args, 1, 1)?;
    match &args[0] {
        Value::Dict(entries) => Ok(Value::list(
            lock(entries).keys().cloned().map(Value::String).collect(),
        )),
        other => Err(MiniparError::runtime(format!(
            "`keys` needs a DICT, found {}",
            other.type_name()
        ))),
    }
}

/// `split(text, sep?)`: on whitespace runs without a separator.
fn builtin_split(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("split", &args, 1, 2)?;
    let text = as_str(&args[0], "`split` text")?;

    let parts: Vec<Value> = match args.get(1) {
        None => text.split_whitespace().map(|p| Value::String(p.to_string())).collect(),
        Some(sep) => {
            let sep = as_str(sep, "`split` separator")?;
            if sep.is_empty() {
                return Err(MiniparError::runtime("`split` separator is empty"));
            }
            text.split(sep).map(|p| Value::String(p.to_string())).collect()
        }
    };
    Ok(Value::list(parts))
}

/* ============================================================================
 * Math
 * ============================================================================
 */

/// `pow(base, exponent)`: integral for integer operands and a small
/// non-negative exponent.
fn builtin_pow(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("pow", &args, 2, 2)?;
    if let (Value::Int(base), Value::Int(exponent)) = (&args[0], &args[1]) {
        if let Ok(exponent) = u32::try_from(*exponent) {
            return base
                .checked_pow(exponent)
                .map(Value::Int)
                .ok_or_else(|| MiniparError::runtime("integer overflow"));
        }
    }
    let base = as_number(&args[0], "`pow` base")?;
    let exponent = as_number(&args[1], "`pow` exponent")?;
    Ok(Value::Float(base.powf(exponent)))
}

fn builtin_sqrt(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("sqrt", &args, 1, 1)?;
    let n = as_number(&args[0], "`sqrt` operand")?;
    if n < 0.0 {
        return Err(MiniparError::runtime("`sqrt` of a negative number"));
    }
    Ok(Value::Float(n.sqrt()))
}

fn builtin_exp(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("exp", &args, 1, 1)?;
    Ok(Value::Float(as_number(&args[0], "`exp` operand")?.exp()))
}

/// `range(stop)`, `range(start, stop)`, `range(start, stop, step)`.
fn builtin_range(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    arity("range", &args, 1, 3)?;
    let bounds = args
        .iter()
        .map(|v| as_int(v, "`range` bound"))
        .collect::<Result<Vec<i64>>>()?;

    let (start, stop, step) = match bounds.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => (0, 0, 1),
    };
    if step == 0 {
        return Err(MiniparError::runtime("`range` step must not be zero"));
    }

    let mut values = Vec::new();
    let mut current = start;
    while (step > 0 && current < stop) || (step < 0 && current > stop) {
        values.push(Value::Int(current));
        match current.checked_add(step) {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(Value::list(values))
}

/// `random()` is a float in `[0, 1)`; `random(a, b)` an integer in `[a, b]`.
fn builtin_random(_runner: &Runner, _env: &Arc<VarTable>, args: Vec<Value>) -> Result<Value> {
    let mut rng = rand::thread_rng();
    match args.as_slice() {
        [] => Ok(Value::Float(rng.gen::<f64>())),
        [low, high] => {
            let low = as_int(low, "`random` lower bound")?;
            let high = as_int(high, "`random` upper bound")?;
            if low > high {
                return Err(MiniparError::runtime(format!(
                    "`random` range is empty: {low} > {high}"
                )));
            }
            Ok(Value::Int(rng.gen_range(low..=high)))
        }
        _ => Err(MiniparError::runtime(format!(
            "`random` expects 0 or 2 arguments, got {}",
            args.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::console::Console;
    use crate::options::RunOptions;

    fn call(name: &str, args: Vec<Value>) -> Result<Value> {
        let runner = Runner::new(Console::captured(""), RunOptions::default());
        let env = Arc::clone(&runner.globals);
        match lookup(name) {
            Some(builtin) => builtin(&runner, &env, args),
            None => Err(MiniparError::runtime(format!("no builtin {name}"))),
        }
    }

    fn text(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[test]
    fn every_signature_resolves() {
        for (name, _) in crate::symbol::BUILTIN_SIGNATURES {
            assert!(lookup(name).is_some(), "missing builtin {name}");
        }
    }

    #[test]
    fn conversions() {
        assert_eq!(call("to_number", vec![text(" 42 ")]).ok(), Some(Value::Int(42)));
        assert_eq!(call("to_number", vec![text("2.5")]).ok(), Some(Value::Float(2.5)));
        assert!(call("to_number", vec![text("abc")]).is_err());
        assert_eq!(call("to_string", vec![Value::Float(2.0)]).ok(), Some(text("2.0")));
        assert_eq!(call("to_bool", vec![text("")]).ok(), Some(Value::Bool(false)));
    }

    #[test]
    fn string_helpers() {
        assert_eq!(call("isalpha", vec![text("abc")]).ok(), Some(Value::Bool(true)));
        assert_eq!(call("isalpha", vec![text("ab1")]).ok(), Some(Value::Bool(false)));
        assert_eq!(call("isnum", vec![text("3.5")]).ok(), Some(Value::Bool(true)));
        assert_eq!(call("strip", vec![text("  x ")]).ok(), Some(text("x")));
        assert_eq!(call("lower", vec![text("AbC")]).ok(), Some(text("abc")));
        assert_eq!(
            call("split", vec![text("a,b"), text(",")]).ok(),
            Some(Value::list(vec![text("a"), text("b")]))
        );
    }

    #[test]
    fn list_helpers_share_the_container() -> Result<()> {
        let list = Value::list(vec![Value::Int(3), Value::Int(1)]);
        call("append", vec![list.clone(), Value::Int(2)])?;
        call("sort", vec![list.clone()])?;
        assert_eq!(
            list,
            Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(call("sum", vec![list.clone()])?, Value::Int(6));
        assert_eq!(call("len", vec![list])?, Value::Int(3));
        Ok(())
    }

    #[test]
    fn contains_accepts_the_container_itself() -> Result<()> {
        let list = Value::list(vec![Value::list(vec![Value::Int(1)])]);
        assert_eq!(call("contains", vec![list.clone(), list.clone()])?, Value::Bool(false));

        let dict = Value::dict(BTreeMap::new());
        assert_eq!(call("contains", vec![dict.clone(), dict])?, Value::Bool(false));

        let inner = Value::list(vec![Value::Int(1)]);
        let outer = Value::list(vec![inner.clone()]);
        assert_eq!(call("contains", vec![outer, inner])?, Value::Bool(true));
        Ok(())
    }

    #[test]
    fn math_helpers() {
        assert_eq!(call("pow", vec![Value::Int(2), Value::Int(10)]).ok(), Some(Value::Int(1024)));
        assert!(call("sqrt", vec![Value::Int(-1)]).is_err());
        assert_eq!(
            call("range", vec![Value::Int(3)]).ok(),
            Some(Value::list(vec![Value::Int(0), Value::Int(1), Value::Int(2)]))
        );
        assert!(call("range", vec![Value::Int(0), Value::Int(3), Value::Int(0)]).is_err());
    }

    #[test]
    fn random_stays_in_range() -> Result<()> {
        for _ in 0..32 {
            match call("random", vec![Value::Int(1), Value::Int(3)])? {
                Value::Int(n) => assert!((1..=3).contains(&n)),
                other => panic!("unexpected {other:?}"),
            }
        }
        Ok(())
    }
}
