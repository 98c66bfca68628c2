//! Room Directory
//!
//! Room 名から Room を解決し、Room ごとの排他スコープ（ロック）を管理します。
//! ロックは Room 名ごとに必要になった時点で作成され、最後の保持者と待機者が
//! いなくなった時点でテーブルから削除されます。異なる Room 同士が競合することはありません。

use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex, PoisonError},
};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{DrainReport, Room, RoomId, RoomName, RoomRepository, RoomTeardown};

use super::error::ChatError;

type LockTable = HashMap<RoomName, Arc<Mutex<()>>>;

/// Room 名ごとの非同期ミューテックスのテーブル
#[derive(Debug, Default)]
pub struct RoomLocks {
    table: Arc<StdMutex<LockTable>>,
}

impl RoomLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Room 名のロックを取得する（他の保持者が解放するまで待機）
    pub async fn acquire(&self, name: &RoomName) -> RoomGuard {
        let lock = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(table.entry(name.clone()).or_default())
        };
        let guard = lock.lock_owned().await;

        RoomGuard {
            name: name.clone(),
            guard: Some(guard),
            table: Arc::clone(&self.table),
        }
    }

    /// テーブルに残っているロックの数
    pub fn len(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 保持中の Room ロック
///
/// Drop 時にロックを解放し、待機者がいなければテーブルのエントリを削除します。
pub struct RoomGuard {
    name: RoomName,
    guard: Option<OwnedMutexGuard<()>>,
    table: Arc<StdMutex<LockTable>>,
}

impl Drop for RoomGuard {
    fn drop(&mut self) {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        // Release while holding the table so no new waiter can slip in between
        drop(self.guard.take());
        if let Some(lock) = table.get(&self.name)
            && Arc::strong_count(lock) == 1
        {
            table.remove(&self.name);
        }
    }
}

/// Room の名前解決・作成・削除と Room ロックの窓口
pub struct RoomDirectory {
    rooms: Arc<dyn RoomRepository>,
    teardown: Arc<dyn RoomTeardown>,
    locks: RoomLocks,
}

impl RoomDirectory {
    pub fn new(rooms: Arc<dyn RoomRepository>, teardown: Arc<dyn RoomTeardown>) -> Self {
        Self {
            rooms,
            teardown,
            locks: RoomLocks::new(),
        }
    }

    /// 名前で Room を取得し、なければ作成する（名前に対して冪等）
    pub async fn get_or_create(&self, name: &RoomName) -> Result<Room, ChatError> {
        Ok(self.rooms.create_if_absent(name).await?)
    }

    /// ID で Room を取得
    pub async fn get(&self, room_id: &RoomId) -> Result<Room, ChatError> {
        Ok(self.rooms.get_by_id(room_id).await?)
    }

    /// Room レコードのみを削除する
    ///
    /// メッセージとユーザーは残るため、通常は [`RoomDirectory::drain`] を使います。
    pub async fn delete(&self, room_id: &RoomId) -> Result<(), ChatError> {
        Ok(self.rooms.delete(room_id).await?)
    }

    /// 全ての Room を作成順に取得
    pub async fn list(&self) -> Result<Vec<Room>, ChatError> {
        Ok(self.rooms.list().await?)
    }

    /// Room のメッセージ・ユーザー・Room 自体を 1 回の操作で削除する
    ///
    /// 呼び出し側は Room のロックを保持している必要があります。
    pub async fn drain(&self, room: &Room) -> Result<DrainReport, ChatError> {
        let report = self.teardown.drain(&room.id).await?;
        tracing::info!(
            "Room '{}' ({}) drained: {} messages, {} users removed",
            room.name,
            room.id,
            report.removed_messages,
            report.removed_users
        );
        Ok(report)
    }

    /// Room 名のロックを取得
    pub async fn lock(&self, name: &RoomName) -> RoomGuard {
        self.locks.acquire(name).await
    }
}
