use crate::{
    error::PersistenceResult,
    model::{BankAccountDetails, CompanyWallet},
};
use rusqlite::{params, Connection, OptionalExtension};

pub(super) fn write_wallet(conn: &Connection, wallet: &CompanyWallet) -> PersistenceResult<()> {
    let bank = wallet.bank_account_details.as_ref();
    conn.execute(
        "INSERT INTO company_wallet (
             wallet_id, total_revenue, completed_commission, pending_commission,
             total_transactions, bank_account_linked, bank_account_name,
             bank_account_number, bank_name, bank_routing_number, last_updated)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT (wallet_id) DO UPDATE SET
             total_revenue        = excluded.total_revenue,
             completed_commission = excluded.completed_commission,
             pending_commission   = excluded.pending_commission,
             total_transactions   = excluded.total_transactions,
             bank_account_linked  = excluded.bank_account_linked,
             bank_account_name    = excluded.bank_account_name,
             bank_account_number  = excluded.bank_account_number,
             bank_name            = excluded.bank_name,
             bank_routing_number  = excluded.bank_routing_number,
             last_updated         = excluded.last_updated",
        params![
            wallet.total_revenue,
            wallet.completed_commission,
            wallet.pending_commission,
            wallet.total_transactions as i64,
            wallet.bank_account_linked as i32,
            bank.map(|b| b.account_name.as_str()),
            bank.map(|b| b.account_number.as_str()),
            bank.map(|b| b.bank_name.as_str()),
            bank.map(|b| b.routing_number.as_str()),
            wallet.last_updated,
        ],
    )?;
    Ok(())
}

pub(super) fn read_wallet(conn: &Connection) -> PersistenceResult<Option<CompanyWallet>> {
    let wallet = conn
        .query_row(
            "SELECT total_revenue, completed_commission, pending_commission,
                    total_transactions, bank_account_linked, bank_account_name,
                    bank_account_number, bank_name, bank_routing_number, last_updated
             FROM company_wallet WHERE wallet_id = 1",
            [],
            |row| {
                let account_name: Option<String> = row.get(5)?;
                let bank_account_details = match account_name {
                    Some(account_name) => Some(BankAccountDetails {
                        account_name,
                        account_number: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                        bank_name:      row.get::<_, Option<String>>(7)?.unwrap_or_default(),
                        routing_number: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
                    }),
                    None => None,
                };
                Ok(CompanyWallet {
                    total_revenue:        row.get(0)?,
                    completed_commission: row.get(1)?,
                    pending_commission:   row.get(2)?,
                    total_transactions:   row.get::<_, i64>(3)? as u64,
                    bank_account_linked:  row.get::<_, i32>(4)? != 0,
                    bank_account_details,
                    last_updated:         row.get(9)?,
                })
            },
        )
        .optional()?;
    Ok(wallet)
}
