// SPDX-License-Identifier: MIT

//! Voucher minting and redemption rules.
//!
//! Codes come from the system CSPRNG so they are unguessable and
//! non-sequential; uniqueness is enforced against the store with a
//! bounded retry. Minting only builds the `Voucher` value — the
//! orchestrator persists it inside the same atomic batch as the XP
//! mutation that earned it.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::models::{Voucher, VoucherSource, VoucherTemplate};
use crate::store::RewardsStore;

/// Random bytes per voucher code (128 bits before encoding).
const CODE_BYTES: usize = 16;

/// Collision retries before giving up; collisions at 128 bits mean a
/// broken RNG, not bad luck.
const MAX_CODE_ATTEMPTS: usize = 5;

/// Builds vouchers with store-unique codes.
#[derive(Clone)]
pub struct VoucherMinter {
    store: Arc<dyn RewardsStore>,
    rng: Arc<SystemRandom>,
}

impl VoucherMinter {
    pub fn new(store: Arc<dyn RewardsStore>) -> Self {
        Self {
            store,
            rng: Arc::new(SystemRandom::new()),
        }
    }

    /// Build a voucher for `user_id` from a template.
    ///
    /// `source_id` names the originating event (level number, exchange
    /// rate index). The caller persists the result.
    pub async fn mint(
        &self,
        user_id: &str,
        template: &VoucherTemplate,
        source: VoucherSource,
        source_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Voucher> {
        let code = self.unique_code().await?;

        Ok(Voucher {
            id: Uuid::new_v4().to_string(),
            code,
            user_id: user_id.to_string(),
            discount_percentage: template.discount_percentage,
            expiry_date: now + Duration::days(i64::from(template.expiry_days)),
            is_used: false,
            used_at: None,
            partner: template.partner.clone(),
            voucher_type: template.voucher_type,
            source,
            source_id,
            created_at: now,
        })
    }

    async fn unique_code(&self) -> Result<String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code(self.rng.as_ref())?;
            if !self.store.voucher_code_exists(&code).await? {
                return Ok(code);
            }
            tracing::warn!("Voucher code collision, regenerating");
        }
        Err(EngineError::Internal(anyhow::anyhow!(
            "could not generate a unique voucher code after {} attempts",
            MAX_CODE_ATTEMPTS
        )))
    }
}

/// Generate one candidate code: `RW-` + URL-safe base64 of random bytes.
fn generate_code(rng: &dyn SecureRandom) -> Result<String> {
    let mut bytes = [0u8; CODE_BYTES];
    rng.fill(&mut bytes)
        .map_err(|_| EngineError::Internal(anyhow::anyhow!("system RNG failure")))?;
    Ok(format!("RW-{}", URL_SAFE_NO_PAD.encode(bytes)))
}

/// Check that a voucher can be redeemed right now.
///
/// Order matters: a used voucher past its expiry reports
/// `VOUCHER_ALREADY_USED`, not `VOUCHER_EXPIRED`.
pub fn validate_redeemable(voucher: &Voucher, now: DateTime<Utc>) -> Result<()> {
    if voucher.is_used {
        return Err(EngineError::VoucherAlreadyUsed);
    }
    if voucher.expiry_date < now {
        return Err(EngineError::VoucherExpired);
    }
    Ok(())
}
