//! Sequence Allocator
//!
//! 人类可读的单调递增编号: `ORD001`, `DIS004`, `RM-012` ...
//!
//! 读取同前缀下字典序最大的编号，解析数字后缀，加一后补零。
//! 两个并发调用方可能读到同一个 "最后编号" 并算出相同的 "下一个编号"——
//! 这是已知竞态；标识符列上的唯一索引会让后写者插入失败
//! (`DuplicateDispatchId` 等可重试错误)，调用方需重新分配后重试。
//! 竞争激烈时编号不保证无空洞。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::utils::{AppError, AppResult};

/// 编号后缀补零宽度
const SEQ_WIDTH: usize = 3;

/// 序号分配器
#[derive(Clone)]
pub struct SequenceAllocator {
    db: Surreal<Db>,
}

impl SequenceAllocator {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// 分配 `table.field` 列上前缀为 `prefix` 的下一个编号
    ///
    /// `table`/`field` 必须是代码内常量，不接受用户输入。
    pub async fn next_id(&self, table: &str, field: &str, prefix: &str) -> AppResult<String> {
        let query = format!(
            "SELECT VALUE {field} FROM {table} \
             WHERE string::starts_with({field}, $prefix) \
             ORDER BY {field} DESC LIMIT 1"
        );

        let mut result = self
            .db
            .query(query)
            .bind(("prefix", prefix.to_string()))
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let last: Vec<String> = result
            .take(0)
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok(next_in_sequence(last.first().map(String::as_str), prefix))
    }
}

/// 由上一个编号计算下一个编号 (纯函数)
///
/// 无历史编号时从 1 开始；后缀解析失败同样从 1 开始 (历史脏数据容错)。
pub fn next_in_sequence(last: Option<&str>, prefix: &str) -> String {
    let next = last
        .and_then(|id| id.strip_prefix(prefix))
        .and_then(|suffix| suffix.parse::<u64>().ok())
        .map(|n| n + 1)
        .unwrap_or(1);

    format!("{prefix}{next:0SEQ_WIDTH$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_one() {
        assert_eq!(next_in_sequence(None, "DIS"), "DIS001");
        assert_eq!(next_in_sequence(None, "RM-"), "RM-001");
    }

    #[test]
    fn test_increments_and_pads() {
        assert_eq!(next_in_sequence(Some("DIS003"), "DIS"), "DIS004");
        assert_eq!(next_in_sequence(Some("ORD009"), "ORD"), "ORD010");
        assert_eq!(next_in_sequence(Some("RM-041"), "RM-"), "RM-042");
    }

    #[test]
    fn test_width_grows_past_999() {
        // 超过补零宽度后编号自然变长，字典序仍然递增
        assert_eq!(next_in_sequence(Some("DIS999"), "DIS"), "DIS1000");
        assert_eq!(next_in_sequence(Some("DIS1000"), "DIS"), "DIS1001");
    }

    #[test]
    fn test_malformed_suffix_restarts() {
        assert_eq!(next_in_sequence(Some("DIS-old"), "DIS"), "DIS001");
        assert_eq!(next_in_sequence(Some("XYZ003"), "DIS"), "DIS001");
    }
}
