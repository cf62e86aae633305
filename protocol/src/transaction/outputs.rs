//! Transaction outputs and the minimum-UTXO rule.

use minicbor::encode::{Error, Write};
use minicbor::{Encode, Encoder};

use super::address::Address;
use super::cbor;
use super::error::BuildError;
use super::types::{Lovelace, ValueError};
use crate::config::UTXO_ENTRY_OVERHEAD_BYTES;

/// An address paired with the lovelace it receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutput {
    pub address: Address,
    pub value: Lovelace,
}

impl TransactionOutput {
    pub fn new(address: Address, value: Lovelace) -> Self {
        Self { address, value }
    }

    /// Encoded size of this output inside a transaction body.
    pub fn encoded_len(&self) -> usize {
        cbor::encoded_len(self)
    }
}

impl<C> Encode<C> for TransactionOutput {
    /// `[address_bytes, coin]`
    fn encode<W: Write>(&self, e: &mut Encoder<W>, _ctx: &mut C) -> Result<(), Error<W::Error>> {
        e.array(2)?
            .bytes(self.address.as_bytes())?
            .u64(self.value.as_u64())?;
        Ok(())
    }
}

/// Smallest value the ledger accepts for `output`:
/// `coins_per_utxo_byte * (160 + encoded output size)`.
///
/// The encoded size depends on the value itself (CBOR integers grow with
/// magnitude), so the result is exact only for the value the output carries.
pub fn min_utxo_value(
    output: &TransactionOutput,
    coins_per_utxo_byte: Lovelace,
) -> Result<Lovelace, ValueError> {
    let bytes = UTXO_ENTRY_OVERHEAD_BYTES
        .checked_add(output.encoded_len() as u64)
        .ok_or(ValueError::Overflow)?;
    coins_per_utxo_byte.checked_mul(bytes)
}

/// Builds the single recipient output and checks it against the minimum-UTXO
/// rule.
pub fn compose_recipient_output(
    recipient: &Address,
    amount: Lovelace,
    coins_per_utxo_byte: Lovelace,
) -> Result<TransactionOutput, BuildError> {
    let output = TransactionOutput::new(recipient.clone(), amount);
    let minimum = min_utxo_value(&output, coins_per_utxo_byte)?;
    if output.value < minimum {
        return Err(BuildError::OutputBelowMinimum {
            value: output.value,
            minimum,
        });
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::KeyHash;

    fn recipient() -> Address {
        Address::enterprise(&KeyHash::from_bytes([0x11; 28]), false).unwrap()
    }

    #[test]
    fn encodes_address_bytes_then_coin() {
        let out = TransactionOutput::new(recipient(), Lovelace::new(10));
        let bytes = cbor::to_vec(&out);
        assert_eq!(bytes[0], 0x82);
        // bytes(29) header, then header byte 0x60 of a testnet enterprise address.
        assert_eq!(&bytes[1..3], &[0x58, 29]);
        assert_eq!(bytes[3], 0x60);
        assert_eq!(*bytes.last().unwrap(), 10);
        assert_eq!(out.encoded_len(), 1 + 2 + 29 + 1);
    }

    #[test]
    fn minimum_grows_with_output_size() {
        let small = TransactionOutput::new(recipient(), Lovelace::new(10));
        let large = TransactionOutput::new(recipient(), Lovelace::new(10_000_000_000));
        let per_byte = Lovelace::new(4310);
        assert_eq!(
            min_utxo_value(&small, per_byte).unwrap(),
            Lovelace::new(4310 * (160 + 33))
        );
        assert!(min_utxo_value(&large, per_byte).unwrap() > min_utxo_value(&small, per_byte).unwrap());
    }

    #[test]
    fn recipient_below_minimum_is_rejected() {
        let err = compose_recipient_output(&recipient(), Lovelace::new(1_000), Lovelace::new(4310))
            .unwrap_err();
        assert!(matches!(err, BuildError::OutputBelowMinimum { .. }));
    }

    #[test]
    fn recipient_output_carries_exact_amount() {
        let out =
            compose_recipient_output(&recipient(), Lovelace::new(2_000_000), Lovelace::new(4310))
                .unwrap();
        assert_eq!(out.value, Lovelace::new(2_000_000));
        assert_eq!(out.address, recipient());
    }
}
