//! Event folding
//!
//! One fold procedure per event kind. Each fold runs to completion before
//! the next event is considered: aggregate reads, arithmetic, writes, and
//! invariant checks, in a fixed order. Invariant violations record warnings
//! and the out-of-invariant value is stored as computed; nothing is clamped
//! or rolled back.

use crate::config::{is_zero_address, normalize_address};
use crate::events::*;
use crate::ledger_core::checks::{self, ReleaseSubject};
use crate::ledger_core::entities::*;
use crate::ledger_core::ids;
use crate::ledger_core::recognition::{self, RecognitionOutcome, RecognitionTrigger};
use crate::ledger_core::store::Ledger;

/// Which compute leg an event reported; decides the interaction detail, the
/// user's list, and the warning label.
#[derive(Debug, Clone, Copy)]
enum ComputeLeg {
    Input,
    Output,
}

impl Ledger {
    /// Fold one event into the ledger.
    ///
    /// Events from a different emitter than the configured vault are skipped,
    /// except forwarder events, which the forwarder contract emits itself.
    pub fn apply(&mut self, event: &VaultEvent) {
        let meta = &event.meta;
        if !matches!(event.payload, EventPayload::ForwardedTransaction(_))
            && !self.is_vault(&meta.emitter)
        {
            log::debug!(
                "ignoring {} log from foreign emitter {}",
                meta.tx_hash,
                meta.emitter
            );
            return;
        }

        match &event.payload {
            EventPayload::VaultTransaction(ev) => self.fold_vault_transaction(meta, ev),
            EventPayload::ChangeUnwrapFee(ev) => self.fold_change_unwrap_fee(meta, ev),
            EventPayload::Erc20Wrap(ev) => self.fold_erc20_wrap(meta, ev),
            EventPayload::Erc20Unwrap(ev) => self.fold_erc20_unwrap(meta, ev),
            EventPayload::Erc721Wrap(ev) => self.fold_erc721_wrap(meta, ev),
            EventPayload::Erc721Unwrap(ev) => self.fold_erc721_unwrap(meta, ev),
            EventPayload::Erc1155Wrap(ev) => self.fold_erc1155_wrap(meta, ev),
            EventPayload::Erc1155Unwrap(ev) => self.fold_erc1155_unwrap(meta, ev),
            EventPayload::ComputeInputAmount(ev) => {
                self.fold_compute(meta, ev, ComputeLeg::Input)
            }
            EventPayload::ComputeOutputAmount(ev) => {
                self.fold_compute(meta, ev, ComputeLeg::Output)
            }
            EventPayload::TokensRegistered(ev) => self.fold_tokens_registered(meta, ev),
            EventPayload::TransferSingle(ev) => self.fold_transfer_single(meta, ev),
            EventPayload::TransferBatch(ev) => self.fold_transfer_batch(meta, ev),
            EventPayload::ForwardedTransaction(ev) => self.fold_forwarded(meta, ev),
        }
    }

    fn fold_vault_transaction(&mut self, meta: &EventMeta, ev: &VaultTransactionEvent) {
        let tx = self.state.transaction_mut(&meta.tx_hash);
        tx.user = normalize_address(&ev.user);
        tx.timestamp = meta.timestamp;
        tx.block = meta.block;
    }

    fn fold_change_unwrap_fee(&mut self, meta: &EventMeta, ev: &ChangeUnwrapFeeEvent) {
        let sender = normalize_address(&ev.sender);
        let fee_id = ids::fee_change_id(&meta.tx_hash, &sender);

        self.state.fee_changes.insert(
            fee_id.clone(),
            FeeChange {
                id: fee_id.clone(),
                fee_amount: ev.new_fee.clone(),
                owner: sender,
                timestamp: meta.timestamp,
                block: meta.block,
            },
        );

        self.state.fee_state.previous.push(fee_id.clone());
        self.state.fee_state.current = Some(fee_id);
    }

    fn fold_erc20_wrap(&mut self, meta: &EventMeta, ev: &Erc20WrapEvent) {
        let interaction_id = self.state.next_interaction_id(&meta.tx_hash);
        let token = normalize_address(&ev.token);
        let user = normalize_address(&ev.user);
        let asset_key = ev.asset_id.to_string();

        {
            let contract = self.erc20_contract_mut(&token);
            contract.wrapped_amount += &ev.wrapped_amount;
            recognition::advance(&mut contract.recognized, RecognitionTrigger::Wrap);
        }

        self.state.interactions.insert(
            interaction_id.clone(),
            Interaction {
                id: interaction_id.clone(),
                user: user.clone(),
                external_contract: token.clone(),
                timestamp: meta.timestamp,
                block: meta.block,
                detail: InteractionDetail::Erc20Wrap {
                    asset_id: asset_key.clone(),
                    transferred_amount: ev.transferred_amount.clone(),
                    wrapped_amount: ev.wrapped_amount.clone(),
                    dust: ev.dust.clone(),
                },
            },
        );

        let account = self.state.user_mut(&user);
        account.erc20_wraps.push(interaction_id);
        account.observe_timestamp(meta.timestamp);

        let asset = self.state.derived_asset_mut(&asset_key);
        asset.source_contract = Some(token);
        asset.source_class = Some(AssetClass::Erc20);
        asset.contract_nonce = None;
    }

    fn fold_erc20_unwrap(&mut self, meta: &EventMeta, ev: &Erc20UnwrapEvent) {
        let interaction_id = self.state.next_interaction_id(&meta.tx_hash);
        let token = normalize_address(&ev.token);
        let user = normalize_address(&ev.user);
        let asset_key = ev.asset_id.to_string();

        self.state.interactions.insert(
            interaction_id.clone(),
            Interaction {
                id: interaction_id.clone(),
                user: user.clone(),
                external_contract: token.clone(),
                timestamp: meta.timestamp,
                block: meta.block,
                detail: InteractionDetail::Erc20Unwrap {
                    asset_id: asset_key,
                    transferred_amount: ev.transferred_amount.clone(),
                    unwrapped_amount: ev.unwrapped_amount.clone(),
                    fee_charged: ev.fee_charged.clone(),
                },
            },
        );

        let account = self.state.user_mut(&user);
        account.erc20_unwraps.push(interaction_id.clone());
        account.observe_timestamp(meta.timestamp);

        let (negative, outcome) = {
            let contract = self.erc20_contract_mut(&token);
            contract.wrapped_amount -= &ev.unwrapped_amount;
            contract.cumulative_fees += &ev.fee_charged;
            let negative = checks::check_erc20_negative_wrapped_amount(
                contract,
                &interaction_id,
                meta.timestamp,
            );
            let outcome =
                recognition::advance(&mut contract.recognized, RecognitionTrigger::Unwrap);
            (negative, outcome)
        };

        if let Some(warning) = negative {
            self.state.record_warning(warning);
        }
        if outcome == RecognitionOutcome::ReleaseWhileUnrecognized {
            self.state.record_warning(checks::unrecognized_release_warning(
                ReleaseSubject::Erc20,
                &token,
                &interaction_id,
                meta.timestamp,
            ));
        }
    }

    fn fold_erc721_wrap(&mut self, meta: &EventMeta, ev: &Erc721WrapEvent) {
        let interaction_id = self.state.next_interaction_id(&meta.tx_hash);
        let token = normalize_address(&ev.token);
        let user = normalize_address(&ev.user);
        let asset_key = ev.asset_id.to_string();

        self.state
            .erc721_contract_mut(&token)
            .add_token_id(&asset_key);

        self.state.interactions.insert(
            interaction_id.clone(),
            Interaction {
                id: interaction_id.clone(),
                user: user.clone(),
                external_contract: token.clone(),
                timestamp: meta.timestamp,
                block: meta.block,
                detail: InteractionDetail::Erc721Wrap {
                    asset_id: asset_key.clone(),
                },
            },
        );

        let account = self.state.user_mut(&user);
        account.erc721_wraps.push(interaction_id.clone());
        account.observe_timestamp(meta.timestamp);

        // Pre-wrap custody count must be 0; the increment happens either way.
        let count_warning = {
            let wrapped = self.state.erc721_token_mut(&asset_key);
            let warning =
                checks::check_erc721_wrap_count(wrapped, &interaction_id, meta.timestamp);
            wrapped.wrapped_supply += 1u32;
            warning
        };
        if let Some(warning) = count_warning {
            self.state.record_warning(warning);
        }

        let asset = self.state.derived_asset_mut(&asset_key);
        asset.source_contract = Some(token.clone());
        asset.source_class = Some(AssetClass::Erc721);
        asset.contract_nonce = Some(ev.token_id.clone());

        let contract = self.state.erc721_contract_mut(&token);
        recognition::advance(&mut contract.recognized, RecognitionTrigger::Wrap);
    }

    fn fold_erc721_unwrap(&mut self, meta: &EventMeta, ev: &Erc721UnwrapEvent) {
        let interaction_id = self.state.next_interaction_id(&meta.tx_hash);
        let token = normalize_address(&ev.token);
        let user = normalize_address(&ev.user);
        let asset_key = ev.asset_id.to_string();

        self.state.interactions.insert(
            interaction_id.clone(),
            Interaction {
                id: interaction_id.clone(),
                user: user.clone(),
                external_contract: token.clone(),
                timestamp: meta.timestamp,
                block: meta.block,
                detail: InteractionDetail::Erc721Unwrap {
                    asset_id: asset_key.clone(),
                },
            },
        );

        let account = self.state.user_mut(&user);
        account.erc721_unwraps.push(interaction_id.clone());
        account.observe_timestamp(meta.timestamp);

        // Pre-unwrap custody count must be 1; the decrement happens either
        // way, and may drive the count negative, which the follow-up check
        // catches.
        let (count_warning, negative_warning) = {
            let wrapped = self.state.erc721_token_mut(&asset_key);
            let count_warning =
                checks::check_erc721_unwrap_count(wrapped, &interaction_id, meta.timestamp);
            wrapped.wrapped_supply -= 1u32;
            let negative_warning =
                checks::check_erc721_negative_supply(wrapped, &interaction_id, meta.timestamp);
            (count_warning, negative_warning)
        };
        if let Some(warning) = count_warning {
            self.state.record_warning(warning);
        }
        if let Some(warning) = negative_warning {
            self.state.record_warning(warning);
        }

        let outcome = {
            let contract = self.state.erc721_contract_mut(&token);
            recognition::advance(&mut contract.recognized, RecognitionTrigger::Unwrap)
        };
        if outcome == RecognitionOutcome::ReleaseWhileUnrecognized {
            self.state.record_warning(checks::unrecognized_release_warning(
                ReleaseSubject::Erc721,
                &token,
                &interaction_id,
                meta.timestamp,
            ));
        }
    }

    fn fold_erc1155_wrap(&mut self, meta: &EventMeta, ev: &Erc1155WrapEvent) {
        let interaction_id = self.state.next_interaction_id(&meta.tx_hash);
        let token = normalize_address(&ev.token);
        let user = normalize_address(&ev.user);
        let asset_key = ev.asset_id.to_string();

        self.state
            .erc1155_contract_mut(&token)
            .add_token_id(&asset_key);

        self.state.interactions.insert(
            interaction_id.clone(),
            Interaction {
                id: interaction_id.clone(),
                user: user.clone(),
                external_contract: token.clone(),
                timestamp: meta.timestamp,
                block: meta.block,
                detail: InteractionDetail::Erc1155Wrap {
                    asset_id: asset_key.clone(),
                    wrapped_amount: ev.amount.clone(),
                },
            },
        );

        let account = self.state.user_mut(&user);
        account.erc1155_wraps.push(interaction_id);
        account.observe_timestamp(meta.timestamp);

        self.state.erc1155_token_mut(&asset_key).wrapped_supply += &ev.amount;

        let asset = self.state.derived_asset_mut(&asset_key);
        asset.source_contract = Some(token.clone());
        asset.source_class = Some(AssetClass::Erc1155);
        asset.contract_nonce = Some(ev.token_id.clone());

        let contract = self.state.erc1155_contract_mut(&token);
        recognition::advance(&mut contract.recognized, RecognitionTrigger::Wrap);
    }

    fn fold_erc1155_unwrap(&mut self, meta: &EventMeta, ev: &Erc1155UnwrapEvent) {
        let interaction_id = self.state.next_interaction_id(&meta.tx_hash);
        let token = normalize_address(&ev.token);
        let user = normalize_address(&ev.user);
        let asset_key = ev.asset_id.to_string();

        self.state.interactions.insert(
            interaction_id.clone(),
            Interaction {
                id: interaction_id.clone(),
                user: user.clone(),
                external_contract: token.clone(),
                timestamp: meta.timestamp,
                block: meta.block,
                detail: InteractionDetail::Erc1155Unwrap {
                    asset_id: asset_key.clone(),
                    unwrapped_amount: ev.amount.clone(),
                    fee_charged: ev.fee_charged.clone(),
                },
            },
        );

        let account = self.state.user_mut(&user);
        account.erc1155_unwraps.push(interaction_id.clone());
        account.observe_timestamp(meta.timestamp);

        // The count check reads the pre-decrement state.
        let (count_warning, negative_warning) = {
            let wrapped = self.state.erc1155_token_mut(&asset_key);
            let count_warning =
                checks::check_erc1155_unwrap_count(wrapped, &interaction_id, meta.timestamp);
            wrapped.wrapped_supply -= &ev.amount;
            wrapped.cumulative_fees += &ev.fee_charged;
            let negative_warning =
                checks::check_erc1155_negative_supply(wrapped, &interaction_id, meta.timestamp);
            (count_warning, negative_warning)
        };
        if let Some(warning) = count_warning {
            self.state.record_warning(warning);
        }
        if let Some(warning) = negative_warning {
            self.state.record_warning(warning);
        }

        let outcome = {
            let contract = self.state.erc1155_contract_mut(&token);
            recognition::advance(&mut contract.recognized, RecognitionTrigger::Unwrap)
        };
        if outcome == RecognitionOutcome::ReleaseWhileUnrecognized {
            self.state.record_warning(checks::unrecognized_release_warning(
                ReleaseSubject::Erc1155,
                &token,
                &interaction_id,
                meta.timestamp,
            ));
        }
    }

    fn fold_compute(&mut self, meta: &EventMeta, ev: &ComputeAmountEvent, leg: ComputeLeg) {
        let interaction_id = self.state.next_interaction_id(&meta.tx_hash);
        let primitive_addr = normalize_address(&ev.primitive);
        let user = normalize_address(&ev.user);
        let input_key = ev.input_asset.to_string();
        let output_key = ev.output_asset.to_string();

        let (input_registered, output_registered) = {
            let primitive = self.state.primitive_mut(&primitive_addr);
            primitive.users.push(user.clone());
            primitive.observe_timestamp(meta.timestamp);
            (
                primitive.registered_assets.contains(&input_key),
                primitive.registered_assets.contains(&output_key),
            )
        };

        let detail = match leg {
            ComputeLeg::Input => InteractionDetail::ComputeInput {
                input_asset: input_key.clone(),
                input_amount: ev.input_amount.clone(),
                output_asset: output_key.clone(),
                output_amount: ev.output_amount.clone(),
            },
            ComputeLeg::Output => InteractionDetail::ComputeOutput {
                input_asset: input_key.clone(),
                input_amount: ev.input_amount.clone(),
                output_asset: output_key.clone(),
                output_amount: ev.output_amount.clone(),
            },
        };
        self.state.interactions.insert(
            interaction_id.clone(),
            Interaction {
                id: interaction_id.clone(),
                user: user.clone(),
                external_contract: primitive_addr.clone(),
                timestamp: meta.timestamp,
                block: meta.block,
                detail,
            },
        );

        let account = self.state.user_mut(&user);
        match leg {
            ComputeLeg::Input => account.compute_inputs.push(interaction_id.clone()),
            ComputeLeg::Output => account.compute_outputs.push(interaction_id.clone()),
        }
        account.observe_timestamp(meta.timestamp);

        // Registered assets keep their own supply bookkeeping: the input leg
        // consumes, the output leg issues. Only the consuming side can go
        // negative, so only it is checked.
        let event_label = match leg {
            ComputeLeg::Input => "Compute Input Amount",
            ComputeLeg::Output => "Compute Output Amount",
        };
        if input_registered {
            let warning = {
                let asset = self.state.registered_asset_mut(&input_key);
                asset.supply -= &ev.input_amount;
                checks::check_registered_asset_supply(
                    asset,
                    &interaction_id,
                    event_label,
                    meta.timestamp,
                )
            };
            if let Some(warning) = warning {
                self.state.record_warning(warning);
            }
        }
        if output_registered {
            self.state.registered_asset_mut(&output_key).supply += &ev.output_amount;
        }

        let primitive = self.state.primitive_mut(&primitive_addr);
        recognition::advance(&mut primitive.recognized, RecognitionTrigger::Compute);
    }

    fn fold_tokens_registered(&mut self, meta: &EventMeta, ev: &TokensRegisteredEvent) {
        let registry_key = ids::registry_id(&meta.tx_hash, meta.log_index);
        let creator = normalize_address(&ev.creator);

        self.state
            .primitive_mut(&creator)
            .observe_timestamp(meta.timestamp);

        let mut tokens = Vec::with_capacity(ev.tokens.len());
        for (i, token) in ev.tokens.iter().enumerate() {
            let asset_key = token.to_string();

            let registered = self.state.registered_asset_mut(&asset_key);
            registered.issuer = creator.clone();
            registered.created_timestamp = meta.timestamp;

            let derived = self.state.derived_asset_mut(&asset_key);
            derived.source_contract = Some(creator.clone());
            derived.source_class = Some(AssetClass::Primitive);
            derived.contract_nonce = ev.nonces.get(i).cloned();

            tokens.push(asset_key);
        }

        {
            let primitive = self.state.primitive_mut(&creator);
            primitive.registered_assets.extend(tokens.iter().cloned());
            recognition::advance(&mut primitive.recognized, RecognitionTrigger::Register);
        }

        self.state.registries.insert(
            registry_key.clone(),
            AssetRegistry {
                id: registry_key,
                creator,
                tokens,
                timestamp: meta.timestamp,
                block: meta.block,
            },
        );
    }

    fn fold_transfer_single(&mut self, meta: &EventMeta, ev: &TransferSingleEvent) {
        let operator = normalize_address(&ev.operator);
        let from = normalize_address(&ev.from);
        let to = normalize_address(&ev.to);
        let asset_key = ev.asset_id.to_string();

        let alignment = {
            let tx = self.state.transaction_mut(&meta.tx_hash);
            checks::check_operator_alignment(tx, &operator, "Transfer Single", meta.log_index)
        };
        if let Some(warning) = alignment {
            self.state.record_warning(warning);
        }

        if is_zero_address(&to) {
            let burn_id = self.state.next_burn_id(&meta.tx_hash);
            self.state.burns.insert(
                burn_id.clone(),
                Burn {
                    id: burn_id.clone(),
                    to,
                    from: from.clone(),
                    asset_id: asset_key.clone(),
                    amount: ev.amount.clone(),
                },
            );

            let supply_warning = {
                let asset = self.state.derived_asset_mut(&asset_key);
                asset.supply -= &ev.amount;
                checks::check_derived_asset_supply(
                    asset,
                    &burn_id,
                    "Transfer Single",
                    meta.timestamp,
                )
            };
            self.state.balance_mut(&from, &asset_key).balance -= &ev.amount;
            if let Some(warning) = supply_warning {
                self.state.record_warning(warning);
            }
        } else if is_zero_address(&from) {
            let mint_id = self.state.next_mint_id(&meta.tx_hash);
            self.state.mints.insert(
                mint_id.clone(),
                Mint {
                    id: mint_id.clone(),
                    to: to.clone(),
                    from,
                    asset_id: asset_key.clone(),
                    amount: ev.amount.clone(),
                },
            );

            let supply_warning = {
                let asset = self.state.derived_asset_mut(&asset_key);
                asset.supply += &ev.amount;
                checks::check_derived_asset_supply(
                    asset,
                    &mint_id,
                    "Transfer Single",
                    meta.timestamp,
                )
            };
            let balance_ref = {
                let balance = self.state.balance_mut(&to, &asset_key);
                balance.balance += &ev.amount;
                balance.id.clone()
            };
            self.state.user_mut(&to).add_balance_ref(&balance_ref);
            if let Some(warning) = supply_warning {
                self.state.record_warning(warning);
            }
        } else {
            let transfer_key = ids::transfer_id(&meta.tx_hash, meta.log_index);
            self.state.user_transfers.insert(
                transfer_key.clone(),
                UserTransfer {
                    id: transfer_key.clone(),
                    from: from.clone(),
                    to: to.clone(),
                    asset_id: asset_key.clone(),
                    amount: ev.amount.clone(),
                    timestamp: meta.timestamp,
                    block: meta.block,
                },
            );

            self.state.balance_mut(&from, &asset_key).balance -= &ev.amount;
            let to_balance_ref = {
                let balance = self.state.balance_mut(&to, &asset_key);
                balance.balance += &ev.amount;
                balance.id.clone()
            };

            let sender = self.state.user_mut(&from);
            sender.transfers.push(transfer_key.clone());
            sender.observe_timestamp(meta.timestamp);

            let receiver = self.state.user_mut(&to);
            receiver.transfers.push(transfer_key);
            receiver.add_balance_ref(&to_balance_ref);
            receiver.observe_timestamp(meta.timestamp);
        }
    }

    fn fold_transfer_batch(&mut self, meta: &EventMeta, ev: &TransferBatchEvent) {
        let operator = normalize_address(&ev.operator);
        let from = normalize_address(&ev.from);
        let to = normalize_address(&ev.to);

        let alignment = {
            let tx = self.state.transaction_mut(&meta.tx_hash);
            checks::check_operator_alignment(tx, &operator, "Transfer Batch", meta.log_index)
        };
        if let Some(warning) = alignment {
            self.state.record_warning(warning);
        }

        let entries = ev.asset_ids.iter().zip(&ev.amounts);

        if is_zero_address(&to) {
            for (asset_id, amount) in entries {
                let asset_key = asset_id.to_string();
                let burn_id = self.state.next_burn_id(&meta.tx_hash);
                self.state.burns.insert(
                    burn_id.clone(),
                    Burn {
                        id: burn_id.clone(),
                        to: to.clone(),
                        from: from.clone(),
                        asset_id: asset_key.clone(),
                        amount: amount.clone(),
                    },
                );

                let supply_warning = {
                    let asset = self.state.derived_asset_mut(&asset_key);
                    asset.supply -= amount;
                    checks::check_derived_asset_supply(
                        asset,
                        &burn_id,
                        "Transfer Batch",
                        meta.timestamp,
                    )
                };
                self.state.balance_mut(&from, &asset_key).balance -= amount;
                if let Some(warning) = supply_warning {
                    self.state.record_warning(warning);
                }
            }
        } else if is_zero_address(&from) {
            for (asset_id, amount) in entries {
                let asset_key = asset_id.to_string();
                let mint_id = self.state.next_mint_id(&meta.tx_hash);
                self.state.mints.insert(
                    mint_id.clone(),
                    Mint {
                        id: mint_id.clone(),
                        to: to.clone(),
                        from: from.clone(),
                        asset_id: asset_key.clone(),
                        amount: amount.clone(),
                    },
                );

                let supply_warning = {
                    let asset = self.state.derived_asset_mut(&asset_key);
                    asset.supply += amount;
                    checks::check_derived_asset_supply(
                        asset,
                        &mint_id,
                        "Transfer Batch",
                        meta.timestamp,
                    )
                };
                let balance_ref = {
                    let balance = self.state.balance_mut(&to, &asset_key);
                    balance.balance += amount;
                    balance.id.clone()
                };
                self.state.user_mut(&to).add_balance_ref(&balance_ref);
                if let Some(warning) = supply_warning {
                    self.state.record_warning(warning);
                }
            }
        } else {
            let mut transfer_keys = Vec::new();
            let mut receiver_balance_refs = Vec::new();

            for (i, (asset_id, amount)) in entries.enumerate() {
                let asset_key = asset_id.to_string();
                let transfer_key = ids::batch_transfer_id(&meta.tx_hash, meta.log_index, i);
                self.state.user_transfers.insert(
                    transfer_key.clone(),
                    UserTransfer {
                        id: transfer_key.clone(),
                        from: from.clone(),
                        to: to.clone(),
                        asset_id: asset_key.clone(),
                        amount: amount.clone(),
                        timestamp: meta.timestamp,
                        block: meta.block,
                    },
                );
                transfer_keys.push(transfer_key);

                self.state.balance_mut(&from, &asset_key).balance -= amount;
                let balance = self.state.balance_mut(&to, &asset_key);
                balance.balance += amount;
                receiver_balance_refs.push(balance.id.clone());
            }

            let sender = self.state.user_mut(&from);
            sender.transfers.extend(transfer_keys.iter().cloned());
            sender.observe_timestamp(meta.timestamp);

            let receiver = self.state.user_mut(&to);
            receiver.transfers.extend(transfer_keys);
            for balance_ref in &receiver_balance_refs {
                receiver.add_balance_ref(balance_ref);
            }
            receiver.observe_timestamp(meta.timestamp);
        }
    }

    fn fold_forwarded(&mut self, meta: &EventMeta, ev: &ForwardedTransactionEvent) {
        let forwarder = normalize_address(&ev.forwarder);

        let (tx_id, alignment) = {
            let tx = self.state.transaction_mut(&meta.tx_hash);
            (
                tx.id.clone(),
                checks::check_forwarder_alignment(tx, &forwarder, meta.log_index),
            )
        };
        if let Some(warning) = alignment {
            self.state.record_warning(warning);
        }

        let record_key = ids::forwarder_record_id(&tx_id, meta.log_index);
        self.state.forwarder_records.insert(
            record_key.clone(),
            ForwarderRecord {
                id: record_key,
                forwarder,
                transaction: tx_id,
            },
        );
    }
}
