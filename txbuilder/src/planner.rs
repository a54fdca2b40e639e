use bitcoin::{Amount, TxOut};

use crate::{
    omni::aux_output,
    request::BuildRequest,
    script::locking_script,
    transaction::BuilderConfig,
    BuildError,
};

/// The finalized, ordered outputs of a build.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputPlan {
    pub outputs: Vec<TxOut>,
    /// Value of the change output, `None` when change was folded into the fee.
    pub change: Option<Amount>,
    /// Inputs minus planned outputs: the requested fee plus any change too
    /// small to emit, or any omni value not spent on outputs.
    pub effective_fee: Amount,
}

/// Computes change and produces the ordered output list for `request`.
///
/// Order is: change (when emitted), then either the declared destinations, or
/// for an omni transfer the optional reference output, the payload output and
/// one dust output per destination.
pub fn plan(request: &BuildRequest, config: &BuilderConfig) -> Result<OutputPlan, BuildError> {
    let aux = request.aux_transfer();
    let dust = Amount::from_sat(request.dust);

    let available = request.total_input()?;
    let mut required = request
        .total_destination()?
        .checked_add(request.fee)
        .ok_or_else(|| BuildError::new_malformed_request("fee overflows amount sum"))?;
    if aux.is_some() {
        // value reserved for the reference output
        required = required
            .checked_add(request.dust)
            .ok_or_else(|| BuildError::new_malformed_request("dust overflows amount sum"))?;
    }

    if available < required {
        return Err(BuildError::InsufficientFunds {
            available,
            required,
        });
    }

    let change_amount = Amount::from_sat(available - required);
    let mut outputs = Vec::with_capacity(request.to.len() + 3);

    let change = if change_amount > dust.max(config.dust_floor) {
        outputs.push(TxOut {
            value: change_amount,
            script_pubkey: locking_script(&request.change_address, config.network)?,
        });
        Some(change_amount)
    } else {
        if change_amount > Amount::ZERO {
            log::warn!(
                "Change of {} sat is dust, adding it to the fee",
                change_amount.to_sat()
            );
        }
        None
    };

    match aux {
        Some(aux) => {
            if aux.reference_output {
                outputs.push(TxOut {
                    value: dust,
                    script_pubkey: locking_script(&request.change_address, config.network)?,
                });
            }

            outputs.push(aux_output(aux.currency_id, aux.amount)?);

            // the omni amount travels in the payload, destinations only get dust
            for destination in &request.to {
                outputs.push(TxOut {
                    value: dust,
                    script_pubkey: locking_script(&destination.to, config.network)?,
                });
            }
        }
        None => {
            for destination in &request.to {
                outputs.push(TxOut {
                    value: Amount::from_sat(destination.satoshis),
                    script_pubkey: locking_script(&destination.to, config.network)?,
                });
            }
        }
    }

    // omni outputs carry dust instead of the declared amounts, so the change
    // formula alone does not guarantee the fee is covered
    let planned = outputs.iter().try_fold(0u64, |acc, output| {
        acc.checked_add(output.value.to_sat())
            .ok_or_else(|| BuildError::new_malformed_request("output sum overflows"))
    })?;
    let required = planned
        .checked_add(request.fee)
        .ok_or_else(|| BuildError::new_malformed_request("fee overflows output sum"))?;
    if available < required {
        return Err(BuildError::InsufficientFunds {
            available,
            required,
        });
    }
    let effective_fee = Amount::from_sat(available - planned);

    log::debug!(
        "Planned {} outputs, change {:?}, fee {} sat",
        outputs.len(),
        change.map(|c| c.to_sat()),
        effective_fee.to_sat()
    );

    Ok(OutputPlan {
        outputs,
        change,
        effective_fee,
    })
}
