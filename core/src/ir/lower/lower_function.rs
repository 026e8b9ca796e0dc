//! file: core/src/ir/lower/lower_function.rs
//! description: function definitions, calls and overload resolution.

use super::declare_builtins::lookup_builtin;
use super::early_return::rectify_early_returns;
use super::err::{ErrorKind, TranslationError};
use super::{Lowered, Translator};
use crate::ast::{AstNode, AstNodeKind, DataTypeName, Param, TypeAnnotation};
use crate::ir::module::Function;
use crate::ir::op::{Op, OpKind, Region};
use crate::ir::types::{Type, ValueType};
use crate::ir::value::ValueId;
use crate::symbols::{FunctionSignature, SymbolInfo};

impl Translator<'_> {
    pub(crate) fn visit_function(
        &mut self,
        node: &AstNode,
        name: &str,
        params: &[Param],
        returns: Option<&[TypeAnnotation]>,
        body: &AstNode,
    ) -> Result<(), TranslationError> {
        let location = node.location.as_ref();
        if self.ctx.in_function || self.ctx.symbols.num_scopes() > 1 {
            return Err(TranslationError::new(
                ErrorKind::UnsupportedConstruct,
                "functions can only be defined at top-level",
            )
            .at(node));
        }

        let mut param_names: Vec<&str> = Vec::with_capacity(params.len());
        let mut param_types = Vec::with_capacity(params.len());
        for param in params {
            if param_names.contains(&param.name.as_str()) {
                return Err(TranslationError::new(
                    ErrorKind::UnsupportedConstruct,
                    format!("Function argument name `{}` is used twice.", param.name),
                )
                .at(node));
            }
            param_names.push(&param.name);
            param_types.push(match &param.ty {
                Some(annotation) => self.resolve_type_annotation(node, annotation)?,
                None => Type::Unknown,
            });
        }
        let declared = returns
            .map(|annotations| {
                annotations
                    .iter()
                    .map(|annotation| self.resolve_type_annotation(node, annotation))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        let symbol = self.module.unique_function_symbol(name);
        if let Some(results) = &declared {
            // registered up front so the body may call itself
            self.ctx.functions.insert(FunctionSignature {
                name: name.to_string(),
                symbol: symbol.clone(),
                params: param_types.clone(),
                results: results.clone(),
            });
        }

        let saved = self.ctx.isolate_for_function();
        self.builder.push_block();
        let args: Vec<_> = param_types
            .iter()
            .map(|ty| self.module.values.fresh(ty.clone()))
            .collect();
        for (param, arg) in params.iter().zip(&args) {
            self.ctx.symbols.put(param.name.clone(), SymbolInfo::writable(*arg));
        }
        let visited = self.visit_statement(body);
        let mut ops = self.builder.pop_block();
        self.ctx.restore(saved);
        visited?;

        if !ops.last().is_some_and(|op| op.kind == OpKind::Return) {
            ops.push(Op::new(OpKind::Return, vec![], vec![]).with_location(location.cloned()));
        }
        rectify_early_returns(&mut ops, &mut self.module)?;

        let returned: Vec<Type> = ops
            .last()
            .map(|op| op.operands.iter().map(|v| self.type_of(*v)).collect())
            .unwrap_or_default();
        let result_types = match declared {
            Some(declared) => {
                if returned.len() != declared.len() {
                    return Err(TranslationError::new(
                        ErrorKind::ArityMismatch,
                        format!(
                            "function `{}` returns a different number of values than specified in the definition ({} vs. {})",
                            name,
                            returned.len(),
                            declared.len()
                        ),
                    )
                    .at(node));
                }
                for (i, (actual, expected)) in returned.iter().zip(&declared).enumerate() {
                    if !actual.equal_unknown_aware(expected) {
                        return Err(TranslationError::new(
                            ErrorKind::TypeAmbiguity,
                            format!(
                                "function `{}` returns a different type for return value #{} than specified in the definition ({} vs. {})",
                                name, i, actual, expected
                            ),
                        )
                        .at(node));
                    }
                }
                declared
            }
            None => returned,
        };

        self.ctx.functions.insert(FunctionSignature {
            name: name.to_string(),
            symbol: symbol.clone(),
            params: param_types.clone(),
            results: result_types.clone(),
        });
        log::debug!("registered function `{}` as `{}`", name, symbol);
        self.module.functions.push(Function {
            name: name.to_string(),
            symbol,
            param_types,
            result_types,
            body: Region::new(args, ops),
            location: location.cloned(),
        });
        Ok(())
    }

    /// Type of a parameter or declared result.
    pub(crate) fn resolve_type_annotation(
        &self,
        node: &AstNode,
        annotation: &TypeAnnotation,
    ) -> Result<Type, TranslationError> {
        let vt = annotation
            .value_type
            .as_deref()
            .map(|name| self.value_type_by_name(node, name))
            .transpose()?;
        match annotation.data_type {
            Some(DataTypeName::Matrix) => Ok(Type::Matrix(vt.unwrap_or(ValueType::Unknown))),
            Some(DataTypeName::Scalar) | None => Ok(vt.map(Type::scalar).unwrap_or(Type::Unknown)),
            Some(DataTypeName::Frame) => Err(TranslationError::new(
                ErrorKind::UnsupportedConstruct,
                "unsupported data type for function argument",
            )
            .at(node)),
        }
    }

    pub(crate) fn visit_call(
        &mut self,
        node: &AstNode,
        name: &str,
        kernel_hint: Option<&str>,
        args: &[AstNode],
    ) -> Result<Lowered, TranslationError> {
        let location = node.location.as_ref();
        if !self.ctx.functions.contains(name) && name == "map" {
            return self.visit_map(node, kernel_hint, args).map(Lowered::Single);
        }

        let values = args
            .iter()
            .map(|arg| self.visit_value(arg))
            .collect::<Result<Vec<_>, _>>()?;

        if self.ctx.functions.contains(name) {
            if kernel_hint.is_some() {
                return Err(TranslationError::new(
                    ErrorKind::UnsupportedConstruct,
                    format!(
                        "kernel hints are not supported for calls to user-defined functions (`{}`)",
                        name
                    ),
                )
                .at(node));
            }
            let arg_types: Vec<Type> = values.iter().map(|v| self.type_of(*v)).collect();
            let signature = self.find_matching_udf(node, name, &arg_types)?;
            let results = self.create(
                OpKind::GenericCall {
                    callee: signature.symbol,
                },
                values,
                signature.results,
                location,
            );
            return Ok(Lowered::from_results(results));
        }

        let Some(spec) = lookup_builtin(name) else {
            return Err(TranslationError::new(
                ErrorKind::UnsupportedConstruct,
                format!("unknown function `{}`", name),
            )
            .at(node));
        };
        if !spec.accepts(values.len()) {
            return Err(TranslationError::new(
                ErrorKind::ArityMismatch,
                format!(
                    "function `{}` expects {} argument(s), but {} were given",
                    name,
                    spec.expected_args(),
                    values.len()
                ),
            )
            .at(node));
        }
        let results = self.create(
            OpKind::Builtin {
                name: name.to_string(),
            },
            values,
            vec![Type::Unknown; spec.results],
            location,
        );
        if let Some(hint) = kernel_hint {
            self.attach_kernel_hint(hint);
        }
        Ok(Lowered::from_results(results))
    }

    /// `map(m, f)`: `f` names a unary user-defined function applied to every
    /// element of the matrix `m`.
    fn visit_map(
        &mut self,
        node: &AstNode,
        kernel_hint: Option<&str>,
        args: &[AstNode],
    ) -> Result<ValueId, TranslationError> {
        let location = node.location.as_ref();
        let [matrix_arg, function_arg] = args else {
            return Err(TranslationError::new(
                ErrorKind::ArityMismatch,
                format!("function `map` expects 2 argument(s), but {} were given", args.len()),
            )
            .at(node));
        };
        let matrix = self.visit_value(matrix_arg)?;
        let Type::Matrix(element) = self.type_of(matrix) else {
            return Err(TranslationError::new(
                ErrorKind::UnsupportedConstruct,
                "the first argument of `map` must be a matrix",
            )
            .at(matrix_arg));
        };
        let AstNodeKind::Identifier { name: function } = &function_arg.kind else {
            return Err(TranslationError::new(
                ErrorKind::UnsupportedConstruct,
                "the second argument of `map` must name a user-defined function",
            )
            .at(function_arg));
        };
        if !self.ctx.functions.contains(function) {
            return Err(TranslationError::new(
                ErrorKind::UnsupportedConstruct,
                format!("unknown function `{}` passed to `map`", function),
            )
            .at(function_arg));
        }
        let signature = self.find_matching_udf(function_arg, function, &[Type::scalar(element)])?;
        let result_type = match signature.results.first() {
            Some(ty) => Type::Matrix(ty.element_type()),
            None => Type::Unknown,
        };
        let symbol = self.const_str(&signature.symbol, location);
        let result = self.create1(
            OpKind::Builtin {
                name: "map".to_string(),
            },
            vec![matrix, symbol],
            result_type,
            location,
        );
        if let Some(hint) = kernel_hint {
            self.attach_kernel_hint(hint);
        }
        Ok(result)
    }

    /// First overload of `name`, in definition order, accepting `arg_types`.
    pub(crate) fn find_matching_udf(
        &self,
        node: &AstNode,
        name: &str,
        arg_types: &[Type],
    ) -> Result<FunctionSignature, TranslationError> {
        if let Some(signature) = self.ctx.functions.resolve(name, arg_types) {
            return Ok(signature.clone());
        }
        let args: Vec<String> = arg_types.iter().map(Type::to_string).collect();
        let options: Vec<String> = self
            .ctx
            .functions
            .candidates(name)
            .iter()
            .map(FunctionSignature::describe)
            .collect();
        Err(TranslationError::new(
            ErrorKind::OverloadResolutionError,
            format!(
                "no definition of function `{}` for argument types ({}), available options: {}",
                name,
                args.join(", "),
                options.join(", ")
            ),
        )
        .at(node))
    }
}
