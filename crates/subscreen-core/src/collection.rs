//! 正規キーで引く構造コレクション
//!
//! 元構造は後勝ち、フラグメントは先勝ちで保持する。挿入方針は
//! 連想配列の偶発的な挙動に頼らず [`InsertPolicy`] として明示する。

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::capability::CanonicalKey;
use crate::fingerprint::Fingerprint;

/// キー衝突時の挿入方針
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertPolicy {
    /// 既存エントリを残し、新しい値は作りもしない
    FirstWriteWins,
    /// 新しい値で上書きする
    LastWriteWins,
}

/// 挿入結果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// 新規キーとして挿入した
    Inserted,
    /// 既存エントリを上書きした（`LastWriteWins`）
    Replaced,
    /// 既存エントリを残した（`FirstWriteWins`）
    Kept,
}

/// 指紋と構造ハンドルの組
#[derive(Clone, Debug)]
pub struct StoredStructure<H> {
    pub fingerprint: Fingerprint,
    pub structure: H,
}

/// 挿入方針つきのキー付きコレクション。反復順はキー順で決定的。
#[derive(Debug)]
pub struct KeyedCollection<H> {
    policy: InsertPolicy,
    entries: BTreeMap<CanonicalKey, StoredStructure<H>>,
}

impl<H> KeyedCollection<H> {
    pub fn new(policy: InsertPolicy) -> Self {
        Self {
            policy,
            entries: BTreeMap::new(),
        }
    }

    /// 方針に従って挿入する。
    ///
    /// `make` は値が実際に格納されるときだけ呼ばれる。`FirstWriteWins` で
    /// キーが既にあれば指紋計算などの生成処理は走らない。
    pub fn insert_with<F>(&mut self, key: CanonicalKey, make: F) -> InsertOutcome
    where
        F: FnOnce() -> StoredStructure<H>,
    {
        match self.entries.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(make());
                InsertOutcome::Inserted
            }
            Entry::Occupied(mut slot) => match self.policy {
                InsertPolicy::FirstWriteWins => InsertOutcome::Kept,
                InsertPolicy::LastWriteWins => {
                    slot.insert(make());
                    InsertOutcome::Replaced
                }
            },
        }
    }

    pub fn insert(&mut self, key: CanonicalKey, stored: StoredStructure<H>) -> InsertOutcome {
        self.insert_with(key, || stored)
    }

    pub fn contains_key(&self, key: &CanonicalKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &CanonicalKey) -> Option<&StoredStructure<H>> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalKey, &StoredStructure<H>)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CanonicalKey> {
        self.entries.keys()
    }
}
