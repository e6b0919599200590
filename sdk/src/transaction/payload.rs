//! Transaction bodies.
//!
//! Every body is `[1-byte tag] ‖ variant fields`. The outer fields (amounts,
//! addresses, names, length prefixes) are big-endian fixed width. Contract
//! parameters inside the body are the little-endian codec encoding from
//! [`crate::codec`], wrapped in a 2-byte big-endian length. Both conventions
//! are reproduced exactly; the chain parses them separately.
//!
//! ```text
//! DeployModule    0 ‖ version u32 ‖ len u32 ‖ wasm
//! InitContract    1 ‖ amount u64 ‖ module ref [32] ‖ u16 ‖ "init_" name ‖ u16 ‖ param
//! UpdateContract  2 ‖ amount u64 ‖ index u64 ‖ subindex u64 ‖ u16 ‖ receive name ‖ u16 ‖ param
//! SimpleTransfer  3 ‖ recipient [32] ‖ amount u64
//! ```

use bytes::BufMut;
use thiserror::Error;

use super::energy::{
    CONTRACT_CALL_BASE_ENERGY, DEPLOY_BYTES_PER_ENERGY, SIMPLE_TRANSFER_BASE_ENERGY,
};
use super::types::{AccountAddress, Amount, ContractAddress, ModuleRef};
use crate::codec::{self, CodecError, Encode, Reader, Shape, Value};

const TAG_DEPLOY_MODULE: u8 = 0;
const TAG_INIT_CONTRACT: u8 = 1;
const TAG_UPDATE_CONTRACT: u8 = 2;
const TAG_SIMPLE_TRANSFER: u8 = 3;

/// The only wasm module version this client deploys.
pub const WASM_VERSION: u32 = 0;

/// Prefix the chain expects on every contract init function name.
pub const INIT_PREFIX: &str = "init_";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while building, serializing, or parsing a body.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("unknown payload tag {0}")]
    UnknownTag(u8),

    #[error("name of {0} bytes exceeds the 65535-byte limit")]
    NameTooLong(usize),

    #[error("parameter of {0} bytes exceeds the 65535-byte limit")]
    ParameterTooLarge(usize),

    #[error("wasm module of {0} bytes exceeds the u32 length limit")]
    ModuleTooLarge(usize),

    #[error("invalid contract name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("unsupported wasm version {0}")]
    UnsupportedWasmVersion(u32),
}

// ---------------------------------------------------------------------------
// Parameter
// ---------------------------------------------------------------------------

/// Codec-encoded contract parameter bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameter(Vec<u8>);

impl Parameter {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Concatenates the codec encoding of each value, in order. There is no
    /// leading count; the contract knows its own parameter layout.
    pub fn from_values(values: &[Value]) -> Result<Self, CodecError> {
        let mut out = Vec::new();
        for value in values {
            value.encode_to(&mut out)?;
        }
        Ok(Self(out))
    }

    /// Encodes any typed value as the whole parameter.
    pub fn from_encodable<T: Encode + ?Sized>(value: &T) -> Result<Self, CodecError> {
        Ok(Self(codec::encode(value)?))
    }

    /// Wraps bytes that are already encoded.
    pub fn raw(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reads the parameter back as a sequence of values of the given shapes.
    /// Every byte must be consumed.
    pub fn decode_values(&self, shapes: &[Shape]) -> Result<Vec<Value>, CodecError> {
        let mut reader = Reader::new(&self.0);
        let values = shapes
            .iter()
            .map(|shape| shape.read(&mut reader))
            .collect::<Result<Vec<_>, _>>()?;
        reader.finish()?;
        Ok(values)
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// The body of an account transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Deploy a wasm module.
    DeployModule { wasm: Vec<u8> },

    /// Create a contract instance from a deployed module. `contract_name`
    /// is the bare name; the `init_` prefix is added on the wire.
    InitContract {
        amount: Amount,
        module_ref: ModuleRef,
        contract_name: String,
        param: Parameter,
    },

    /// Call a contract entrypoint. `receive_name` is `contract.entrypoint`.
    UpdateContract {
        amount: Amount,
        address: ContractAddress,
        receive_name: String,
        param: Parameter,
    },

    /// Move tokens to another account.
    SimpleTransfer { to: AccountAddress, amount: Amount },
}

/// A serialized body together with the base energy it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub bytes: Vec<u8>,
    pub base_energy: u64,
}

impl EncodedPayload {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Payload {
    pub fn deploy_module(wasm: Vec<u8>) -> Self {
        Self::DeployModule { wasm }
    }

    pub fn init_contract(
        amount: Amount,
        module_ref: ModuleRef,
        contract_name: impl Into<String>,
        param: Parameter,
    ) -> Self {
        Self::InitContract {
            amount,
            module_ref,
            contract_name: contract_name.into(),
            param,
        }
    }

    /// Builds an update from a contract name and entrypoint.
    pub fn update_contract(
        amount: Amount,
        address: ContractAddress,
        contract_name: &str,
        entrypoint: &str,
        param: Parameter,
    ) -> Self {
        Self::UpdateContract {
            amount,
            address,
            receive_name: format!("{}.{}", contract_name, entrypoint),
            param,
        }
    }

    /// Builds an update from an already joined `contract.entrypoint` name.
    pub fn update_contract_with_receive_name(
        amount: Amount,
        address: ContractAddress,
        receive_name: impl Into<String>,
        param: Parameter,
    ) -> Self {
        Self::UpdateContract {
            amount,
            address,
            receive_name: receive_name.into(),
            param,
        }
    }

    pub fn transfer(to: AccountAddress, amount: Amount) -> Self {
        Self::SimpleTransfer { to, amount }
    }

    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DeployModule { .. } => "deploy_module",
            Self::InitContract { .. } => "init_contract",
            Self::UpdateContract { .. } => "update_contract",
            Self::SimpleTransfer { .. } => "simple_transfer",
        }
    }

    /// Base energy the body declares, independent of size and signatures.
    pub fn base_energy(&self) -> u64 {
        match self {
            Self::DeployModule { wasm } => wasm.len() as u64 / DEPLOY_BYTES_PER_ENERGY,
            Self::InitContract { .. } | Self::UpdateContract { .. } => CONTRACT_CALL_BASE_ENERGY,
            Self::SimpleTransfer { .. } => SIMPLE_TRANSFER_BASE_ENERGY,
        }
    }

    /// Serializes the body to its wire bytes.
    pub fn serialize(&self) -> Result<Vec<u8>, PayloadError> {
        let mut out = Vec::with_capacity(self.size_hint());
        match self {
            Self::DeployModule { wasm } => {
                let len =
                    u32::try_from(wasm.len()).map_err(|_| PayloadError::ModuleTooLarge(wasm.len()))?;
                out.put_u8(TAG_DEPLOY_MODULE);
                out.put_u32(WASM_VERSION);
                out.put_u32(len);
                out.put_slice(wasm);
            }
            Self::InitContract {
                amount,
                module_ref,
                contract_name,
                param,
            } => {
                validate_contract_name(contract_name)?;
                out.put_u8(TAG_INIT_CONTRACT);
                out.put_u64(amount.micro_units());
                out.put_slice(module_ref.as_bytes());
                put_name(&mut out, &format!("{}{}", INIT_PREFIX, contract_name))?;
                put_param(&mut out, param)?;
            }
            Self::UpdateContract {
                amount,
                address,
                receive_name,
                param,
            } => {
                validate_receive_name(receive_name)?;
                out.put_u8(TAG_UPDATE_CONTRACT);
                out.put_u64(amount.micro_units());
                out.put_u64(address.index);
                out.put_u64(address.subindex);
                put_name(&mut out, receive_name)?;
                put_param(&mut out, param)?;
            }
            Self::SimpleTransfer { to, amount } => {
                out.put_u8(TAG_SIMPLE_TRANSFER);
                out.put_slice(to.as_bytes());
                out.put_u64(amount.micro_units());
            }
        }
        Ok(out)
    }

    /// Serializes the body and pairs it with its base energy.
    pub fn encode(&self) -> Result<EncodedPayload, PayloadError> {
        Ok(EncodedPayload {
            bytes: self.serialize()?,
            base_energy: self.base_energy(),
        })
    }

    /// Parses a serialized body. Parameters come back as raw bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        let mut reader = Reader::new(bytes);
        let payload = match reader.read_u8()? {
            TAG_DEPLOY_MODULE => {
                let version = reader.read_u32_be()?;
                if version != WASM_VERSION {
                    return Err(PayloadError::UnsupportedWasmVersion(version));
                }
                let len = reader.read_u32_be()? as usize;
                Self::DeployModule {
                    wasm: reader.read_bytes(len)?.to_vec(),
                }
            }
            TAG_INIT_CONTRACT => {
                let amount = Amount::new(reader.read_u64_be()?);
                let module_ref = ModuleRef::new(reader.read_array()?);
                let init_name = read_name(&mut reader)?;
                let contract_name = init_name
                    .strip_prefix(INIT_PREFIX)
                    .ok_or_else(|| PayloadError::InvalidName {
                        name: init_name.clone(),
                        reason: "missing init_ prefix",
                    })?
                    .to_string();
                let param = read_param(&mut reader)?;
                Self::InitContract {
                    amount,
                    module_ref,
                    contract_name,
                    param,
                }
            }
            TAG_UPDATE_CONTRACT => {
                let amount = Amount::new(reader.read_u64_be()?);
                let address = ContractAddress::new(reader.read_u64_be()?, reader.read_u64_be()?);
                let receive_name = read_name(&mut reader)?;
                let param = read_param(&mut reader)?;
                Self::UpdateContract {
                    amount,
                    address,
                    receive_name,
                    param,
                }
            }
            TAG_SIMPLE_TRANSFER => {
                let to = AccountAddress::new(reader.read_array()?);
                let amount = Amount::new(reader.read_u64_be()?);
                Self::SimpleTransfer { to, amount }
            }
            other => return Err(PayloadError::UnknownTag(other)),
        };
        reader.finish()?;
        Ok(payload)
    }

    fn size_hint(&self) -> usize {
        match self {
            Self::DeployModule { wasm } => 9 + wasm.len(),
            Self::InitContract {
                contract_name,
                param,
                ..
            } => 1 + 8 + 32 + 2 + INIT_PREFIX.len() + contract_name.len() + 2 + param.len(),
            Self::UpdateContract {
                receive_name,
                param,
                ..
            } => 1 + 8 + 16 + 2 + receive_name.len() + 2 + param.len(),
            Self::SimpleTransfer { .. } => 1 + 32 + 8,
        }
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn validate_contract_name(name: &str) -> Result<(), PayloadError> {
    if name.is_empty() {
        return Err(PayloadError::InvalidName {
            name: name.to_string(),
            reason: "empty contract name",
        });
    }
    if name.contains('.') {
        return Err(PayloadError::InvalidName {
            name: name.to_string(),
            reason: "contract name must not contain '.'",
        });
    }
    Ok(())
}

fn validate_receive_name(name: &str) -> Result<(), PayloadError> {
    match name.split_once('.') {
        Some((contract, entrypoint)) if !contract.is_empty() && !entrypoint.is_empty() => Ok(()),
        _ => Err(PayloadError::InvalidName {
            name: name.to_string(),
            reason: "receive name must be contract.entrypoint",
        }),
    }
}

fn put_name(out: &mut Vec<u8>, name: &str) -> Result<(), PayloadError> {
    let len = u16::try_from(name.len()).map_err(|_| PayloadError::NameTooLong(name.len()))?;
    out.put_u16(len);
    out.put_slice(name.as_bytes());
    Ok(())
}

fn put_param(out: &mut Vec<u8>, param: &Parameter) -> Result<(), PayloadError> {
    let len =
        u16::try_from(param.len()).map_err(|_| PayloadError::ParameterTooLarge(param.len()))?;
    out.put_u16(len);
    out.put_slice(param.as_bytes());
    Ok(())
}

fn read_name(reader: &mut Reader<'_>) -> Result<String, PayloadError> {
    let len = reader.read_u16_be()? as usize;
    let bytes = reader.read_bytes(len)?.to_vec();
    String::from_utf8(bytes).map_err(|e| PayloadError::Codec(CodecError::from(e)))
}

fn read_param(reader: &mut Reader<'_>) -> Result<Parameter, PayloadError> {
    let len = reader.read_u16_be()? as usize;
    Ok(Parameter::raw(reader.read_bytes(len)?.to_vec()))
}
