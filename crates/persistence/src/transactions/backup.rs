//! Whole-database copy between backends.

use sqlx::AnyPool;
use tracing::info;

use crate::error::Result;
use crate::queries::{PingQueries, PlayerQueries, ServerQueries, SessionQueries, TpsQueries};

use super::{
    RegisterPlayerTransaction, RegisterUserInfoTransaction, StoreNicknameTransaction,
    StorePingTransaction, StoreServerTransaction, StoreSessionTransaction, StoreSettingsTransaction,
    StoreTpsTransaction, TransactionExecutor,
};

/// Copies all data from a source database into a target database, table
/// group by table group in foreign-key order. Row ids are regenerated on
/// the target; references are carried by UUID and re-resolved there.
///
/// The copy reads the source page by page without a global snapshot, so
/// writes arriving mid-copy may or may not be included. Run it against a
/// quiesced source when an exact image is needed.
pub struct BackupCopy {
    source: AnyPool,
    target: TransactionExecutor,
    page_size: i64,
}

impl BackupCopy {
    pub fn new(source: AnyPool, target: TransactionExecutor, page_size: i64) -> Self {
        Self {
            source,
            target,
            page_size,
        }
    }

    /// Runs the whole copy, waiting for each transaction before moving on.
    pub async fn run(&self) -> Result<()> {
        self.copy_servers().await?;
        self.copy_players().await?;
        self.copy_user_info().await?;
        self.copy_nicknames().await?;
        self.copy_sessions().await?;
        self.copy_tps().await?;
        self.copy_pings().await?;
        self.copy_settings().await?;
        info!("Backup copy finished");
        Ok(())
    }

    async fn copy_servers(&self) -> Result<()> {
        let servers = ServerQueries::new(self.source.clone()).fetch_servers().await?;
        info!(count = servers.len(), "Copying servers");
        for server in servers {
            self.target
                .execute(StoreServerTransaction { server })
                .wait()
                .await?;
        }
        Ok(())
    }

    async fn copy_players(&self) -> Result<()> {
        let queries = PlayerQueries::new(self.source.clone());
        let mut offset = 0;
        loop {
            let page = queries.fetch_players_page(self.page_size, offset).await?;
            if page.is_empty() {
                break;
            }
            info!(offset, count = page.len(), "Copying players");
            offset += page.len() as i64;
            for player in page {
                self.target
                    .execute(RegisterPlayerTransaction { player })
                    .wait()
                    .await?;
            }
        }
        Ok(())
    }

    async fn copy_user_info(&self) -> Result<()> {
        let queries = PlayerQueries::new(self.source.clone());
        let mut offset = 0;
        loop {
            let page = queries.fetch_user_info_page(self.page_size, offset).await?;
            if page.is_empty() {
                break;
            }
            info!(offset, count = page.len(), "Copying user info");
            offset += page.len() as i64;
            for user_info in page {
                self.target
                    .execute(RegisterUserInfoTransaction { user_info })
                    .wait()
                    .await?;
            }
        }
        Ok(())
    }

    async fn copy_nicknames(&self) -> Result<()> {
        let queries = PlayerQueries::new(self.source.clone());
        let mut offset = 0;
        loop {
            let page = queries.fetch_nicknames_page(self.page_size, offset).await?;
            if page.is_empty() {
                break;
            }
            info!(offset, count = page.len(), "Copying nicknames");
            offset += page.len() as i64;
            for nickname in page {
                self.target
                    .execute(StoreNicknameTransaction { nickname })
                    .wait()
                    .await?;
            }
        }
        Ok(())
    }

    async fn copy_sessions(&self) -> Result<()> {
        let queries = SessionQueries::new(self.source.clone());
        let mut offset = 0;
        loop {
            let page = queries.fetch_sessions_page(self.page_size, offset).await?;
            if page.is_empty() {
                break;
            }
            info!(offset, count = page.len(), "Copying sessions");
            offset += page.len() as i64;
            for session in page {
                self.target
                    .execute(StoreSessionTransaction { session })
                    .wait()
                    .await?;
            }
        }
        Ok(())
    }

    async fn copy_tps(&self) -> Result<()> {
        let servers = ServerQueries::new(self.source.clone()).fetch_servers().await?;
        let queries = TpsQueries::new(self.source.clone());
        for server in servers {
            let mut offset = 0;
            loop {
                let page = queries
                    .fetch_tps_page(server.uuid, self.page_size, offset)
                    .await?;
                if page.is_empty() {
                    break;
                }
                info!(server = %server.uuid, offset, count = page.len(), "Copying tps samples");
                offset += page.len() as i64;
                self.target
                    .execute(StoreTpsTransaction {
                        server: server.uuid,
                        samples: page,
                    })
                    .wait()
                    .await?;
            }
        }
        Ok(())
    }

    async fn copy_pings(&self) -> Result<()> {
        let queries = PingQueries::new(self.source.clone());
        let mut offset = 0;
        loop {
            let page = queries.fetch_pings_page(self.page_size, offset).await?;
            if page.is_empty() {
                break;
            }
            info!(offset, count = page.len(), "Copying ping samples");
            offset += page.len() as i64;
            self.target
                .execute(StorePingTransaction { samples: page })
                .wait()
                .await?;
        }
        Ok(())
    }

    async fn copy_settings(&self) -> Result<()> {
        let server_queries = ServerQueries::new(self.source.clone());
        for server in server_queries.fetch_servers().await? {
            if let Some((updated, content)) = server_queries.fetch_settings(server.uuid).await? {
                self.target
                    .execute(StoreSettingsTransaction {
                        server: server.uuid,
                        content,
                        updated,
                    })
                    .wait()
                    .await?;
            }
        }
        Ok(())
    }
}
