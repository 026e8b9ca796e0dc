#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use tabula_core::ir::{Constant, Op, OpKind, Region, Scalar, Type, ValueId, ValueType};
use tabula_core::{
    IrModule, Script, TabulaErrorExt, TranslationError, UserConfig, generate_ast_from_source,
    lower_ast_to_ir,
};

pub fn try_translate_with(
    path: &Path,
    src: &str,
    args: &BTreeMap<String, String>,
    config: &UserConfig,
) -> Result<IrModule, TranslationError> {
    let script = Script::from_source(path, src);
    let ast = match generate_ast_from_source(&script) {
        Ok(ast) => ast,
        Err(err) => panic!("failed to parse test script: {}", err.message()),
    };
    lower_ast_to_ir(&ast, &script.path, args, config)
}

pub fn try_translate(src: &str) -> Result<IrModule, TranslationError> {
    try_translate_with(
        Path::new("test.daph"),
        src,
        &BTreeMap::new(),
        &UserConfig::default(),
    )
}

pub fn translate(src: &str) -> IrModule {
    match try_translate(src) {
        Ok(module) => module,
        Err(err) => panic!("translation failed: {}", err),
    }
}

pub fn translate_err(src: &str) -> TranslationError {
    match try_translate(src) {
        Ok(module) => panic!("translation unexpectedly succeeded:\n{}", module),
        Err(err) => err,
    }
}

/// Every op of `ops`, nested ones included, in pre-order.
pub fn walk<'a>(ops: &'a [Op], out: &mut Vec<&'a Op>) {
    for op in ops {
        out.push(op);
        for region in &op.regions {
            walk(&region.ops, out);
        }
    }
}

pub fn count_ops(ops: &[Op], pred: impl Fn(&Op) -> bool) -> usize {
    let mut all = Vec::new();
    walk(ops, &mut all);
    all.into_iter().filter(|op| pred(op)).count()
}

pub fn find_op<'a>(ops: &'a [Op], pred: impl Fn(&Op) -> bool) -> Option<&'a Op> {
    let mut all = Vec::new();
    walk(ops, &mut all);
    all.into_iter().find(|op| pred(op))
}

/// Runs the scalar subset of a module and returns what `print` printed.
pub fn run(module: &IrModule) -> Vec<String> {
    let mut eval = Evaluator {
        module,
        env: HashMap::new(),
        printed: Vec::new(),
        steps: 0,
    };
    match eval.ops(&module.entry.ops) {
        Flow::Next => {}
        other => panic!("top-level code ended with {:?}", other),
    }
    eval.printed
}

#[derive(Debug)]
enum Flow {
    Next,
    Yield(Vec<Scalar>),
    Condition(bool, Vec<Scalar>),
    Return(Vec<Scalar>),
}

struct Evaluator<'m> {
    module: &'m IrModule,
    env: HashMap<ValueId, Scalar>,
    printed: Vec<String>,
    steps: usize,
}

impl Evaluator<'_> {
    fn get(&self, value: ValueId) -> Scalar {
        match self.env.get(&value) {
            Some(v) => v.clone(),
            None => panic!("value {} used before it was defined", value),
        }
    }

    fn region(&mut self, region: &Region, args: Vec<Scalar>) -> Flow {
        assert_eq!(region.args.len(), args.len(), "region argument count");
        for (arg, value) in region.args.iter().zip(args) {
            self.env.insert(*arg, value);
        }
        self.ops(&region.ops)
    }

    fn ops(&mut self, ops: &[Op]) -> Flow {
        for op in ops {
            match self.op(op) {
                Flow::Next => {}
                other => return other,
            }
        }
        Flow::Next
    }

    fn tick(&mut self) {
        self.steps += 1;
        assert!(self.steps < 100_000, "evaluation does not terminate");
    }

    fn op(&mut self, op: &Op) -> Flow {
        self.tick();
        let operands: Vec<Scalar> = op.operands.iter().map(|v| self.get(*v)).collect();
        let results: Vec<Scalar> = match &op.kind {
            OpKind::Constant(Constant::Scalar(value)) => vec![value.clone()],
            OpKind::Cast => vec![cast(&operands[0], self.module.type_of(op.results[0]))],
            OpKind::Rename => vec![operands[0].clone()],
            OpKind::EwMinus => vec![match &operands[0] {
                Scalar::Float(v) => Scalar::Float(-v),
                other => Scalar::Int(-other.as_i64()),
            }],
            OpKind::EwSign => vec![Scalar::Int(operands[0].as_i64().signum())],
            OpKind::Cond => {
                let chosen = if operands[0].as_bool() { 1 } else { 2 };
                vec![operands[chosen].clone()]
            }
            OpKind::If => {
                let branch = if operands[0].as_bool() {
                    op.regions.first()
                } else {
                    op.regions.get(1)
                };
                match branch.map(|region| self.region(region, vec![])) {
                    Some(Flow::Yield(values)) => values,
                    Some(Flow::Return(values)) => return Flow::Return(values),
                    Some(other) => panic!("if branch ended with {:?}", other),
                    None => vec![],
                }
            }
            OpKind::While => self.while_loop(op, operands),
            OpKind::For => self.for_loop(op, operands),
            OpKind::Condition => {
                return Flow::Condition(operands[0].as_bool(), operands[1..].to_vec());
            }
            OpKind::Yield => return Flow::Yield(operands),
            OpKind::Return => return Flow::Return(operands),
            OpKind::GenericCall { callee } => self.call(callee, operands),
            OpKind::Builtin { name } if name == "print" => {
                self.printed.push(render(&operands[0]));
                vec![]
            }
            kind => match binary(kind) {
                Some(f) => vec![f(&operands[0], &operands[1])],
                None => panic!("the test evaluator does not support `{}`", kind.name()),
            },
        };
        assert_eq!(results.len(), op.results.len(), "result count of `{}`", op.kind.name());
        for (id, value) in op.results.iter().zip(results) {
            self.env.insert(*id, value);
        }
        Flow::Next
    }

    fn while_loop(&mut self, op: &Op, mut values: Vec<Scalar>) -> Vec<Scalar> {
        loop {
            self.tick();
            let (go_on, carried) = match self.region(&op.regions[0], values) {
                Flow::Condition(go_on, carried) => (go_on, carried),
                other => panic!("while condition region ended with {:?}", other),
            };
            if !go_on {
                return carried;
            }
            values = match self.region(&op.regions[1], carried) {
                Flow::Yield(values) => values,
                other => panic!("while body ended with {:?}", other),
            };
        }
    }

    fn for_loop(&mut self, op: &Op, operands: Vec<Scalar>) -> Vec<Scalar> {
        let from = operands[0].as_i64();
        let to = operands[1].as_i64();
        let step = operands[2].as_i64();
        assert!(step > 0, "for-loop step must be positive after lowering, got {}", step);
        let mut carried = operands[3..].to_vec();
        let mut i = from;
        while i < to {
            self.tick();
            let mut args = vec![Scalar::Int(i)];
            args.extend(carried);
            carried = match self.region(&op.regions[0], args) {
                Flow::Yield(values) => values,
                other => panic!("for body ended with {:?}", other),
            };
            i += step;
        }
        carried
    }

    fn call(&mut self, callee: &str, args: Vec<Scalar>) -> Vec<Scalar> {
        let module = self.module;
        let Some(function) = module.function(callee) else {
            panic!("call to unknown function symbol {}", callee);
        };
        let saved = self.env.clone();
        let flow = self.region(&function.body, args);
        self.env = saved;
        match flow {
            Flow::Return(values) => values,
            other => panic!("function {} ended with {:?}", callee, other),
        }
    }
}

fn render(value: &Scalar) -> String {
    match value {
        Scalar::Str(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cast(value: &Scalar, target: &Type) -> Scalar {
    let Type::Scalar(vt) = target else {
        return value.clone();
    };
    match vt {
        ValueType::F64 | ValueType::F32 => Scalar::Float(value.as_f64()),
        ValueType::SI64 | ValueType::SI32 | ValueType::SI8 | ValueType::Index => {
            Scalar::Int(value.as_i64())
        }
        ValueType::UI64 | ValueType::UI32 | ValueType::UI8 => Scalar::UInt(value.as_u64()),
        ValueType::Bool => Scalar::Bool(value.as_bool()),
        ValueType::Str => Scalar::Str(render(value)),
        ValueType::Unknown => value.clone(),
    }
}

fn is_float(value: &Scalar) -> bool {
    matches!(value, Scalar::Float(_))
}

fn arith(a: &Scalar, b: &Scalar, int: fn(i64, i64) -> i64, float: fn(f64, f64) -> f64) -> Scalar {
    if is_float(a) || is_float(b) {
        Scalar::Float(float(a.as_f64(), b.as_f64()))
    } else {
        Scalar::Int(int(a.as_i64(), b.as_i64()))
    }
}

fn binary(kind: &OpKind) -> Option<fn(&Scalar, &Scalar) -> Scalar> {
    let f: fn(&Scalar, &Scalar) -> Scalar = match kind {
        OpKind::EwAdd => |a, b| arith(a, b, |x, y| x + y, |x, y| x + y),
        OpKind::EwSub => |a, b| arith(a, b, |x, y| x - y, |x, y| x - y),
        OpKind::EwMul => |a, b| arith(a, b, |x, y| x * y, |x, y| x * y),
        OpKind::EwDiv => |a, b| arith(a, b, |x, y| x / y, |x, y| x / y),
        OpKind::EwMod => |a, b| arith(a, b, |x, y| x % y, |x, y| x % y),
        OpKind::EwPow => |a, b| Scalar::Float(a.as_f64().powf(b.as_f64())),
        OpKind::EwEq => |a, b| Scalar::Bool(a.as_f64() == b.as_f64()),
        OpKind::EwNeq => |a, b| Scalar::Bool(a.as_f64() != b.as_f64()),
        OpKind::EwLt => |a, b| Scalar::Bool(a.as_f64() < b.as_f64()),
        OpKind::EwLe => |a, b| Scalar::Bool(a.as_f64() <= b.as_f64()),
        OpKind::EwGt => |a, b| Scalar::Bool(a.as_f64() > b.as_f64()),
        OpKind::EwGe => |a, b| Scalar::Bool(a.as_f64() >= b.as_f64()),
        OpKind::EwAnd => |a, b| Scalar::Bool(a.as_bool() && b.as_bool()),
        OpKind::EwOr => |a, b| Scalar::Bool(a.as_bool() || b.as_bool()),
        _ => return None,
    };
    Some(f)
}
