pub mod db;

pub use db::{
    create_db, create_in_memory_db, get_account_name, get_transactions_for_org, insert_account,
    insert_organization, insert_transactions, DbPool, StoredTransaction,
};
