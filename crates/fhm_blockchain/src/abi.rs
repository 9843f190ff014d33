//! Constructor arguments and their ABI encoding.
//!
//! Argument types come from the artifact's JSON ABI. The values a migration
//! can pass are unsigned integers, `bool`, `address`, `string` and `bytes`;
//! any other parameter type is rejected with [`DeployError::Encoding`].

use std::fmt;

use alloy::dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier};
use alloy::json_abi::{JsonAbi, Param};
use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::error::DeployError;

/// A constructor argument value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AbiValue {
    Uint(u128),
    Bool(bool),
    Address(Address),
    String(String),
    Bytes(Bytes),
}

impl AbiValue {
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Uint(_) => "uint",
            Self::Bool(_) => "bool",
            Self::Address(_) => "address",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Address(a) => write!(f, "{a}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Bytes(b) => write!(f, "{b}"),
        }
    }
}

/// Check `args` against the ABI constructor and encode them.
///
/// An ABI with no constructor takes no arguments.
pub fn encode_constructor(abi: &JsonAbi, args: &[AbiValue]) -> Result<Vec<u8>, DeployError> {
    let inputs: &[Param] = abi.constructor().map(|c| c.inputs.as_slice()).unwrap_or_default();
    if inputs.len() != args.len() {
        return Err(DeployError::Encoding(format!(
            "constructor takes {} argument(s), {} given",
            inputs.len(),
            args.len()
        )));
    }

    let Some(ctor) = abi.constructor() else {
        return Ok(Vec::new());
    };

    let values = inputs
        .iter()
        .zip(args)
        .map(|(param, arg)| sol_value(param, arg))
        .collect::<Result<Vec<_>, _>>()?;

    ctor.abi_encode_input(&values)
        .map_err(|e| DeployError::Encoding(e.to_string()))
}

fn sol_value(param: &Param, arg: &AbiValue) -> Result<DynSolValue, DeployError> {
    let ty: DynSolType = param.resolve().map_err(|e| {
        DeployError::Encoding(format!("parameter '{}' has unusable type: {e}", param.name))
    })?;

    let value = match (&ty, arg) {
        (DynSolType::Uint(bits), AbiValue::Uint(v)) => {
            if *bits < 128 && *v >> *bits != 0 {
                return Err(DeployError::Encoding(format!(
                    "value {v} does not fit in uint{bits} parameter '{}'",
                    param.name
                )));
            }
            DynSolValue::Uint(U256::from(*v), *bits)
        }
        (DynSolType::Bool, AbiValue::Bool(b)) => DynSolValue::Bool(*b),
        (DynSolType::Address, AbiValue::Address(a)) => DynSolValue::Address(*a),
        (DynSolType::String, AbiValue::String(s)) => DynSolValue::String(s.clone()),
        (DynSolType::Bytes, AbiValue::Bytes(b)) => DynSolValue::Bytes(b.to_vec()),
        _ => {
            return Err(DeployError::Encoding(format!(
                "parameter '{}' is {}, got a {} value",
                param.name,
                param.ty,
                arg.kind()
            )));
        }
    };
    Ok(value)
}
