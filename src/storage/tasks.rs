//! 任务存储
//!
//! `TaskStore` 持有内存中的任务列表及其对应的 JSON 文件。
//! 每次修改（add / update / update_status / delete）都会同步写回文件后才返回。

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{ensure_dir, timestamp};
use crate::error::{Result, TrackerError};

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TrackerError;

    /// 大小写不敏感，前后空白忽略；其余字面量一律报错
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| TrackerError::invalid_status(s.trim()))
    }
}

/// 任务数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// 任务 ID（从 1 开始递增）
    pub id: u32,
    /// 任务描述
    pub description: String,
    /// 任务状态
    pub status: TaskStatus,
    /// 创建时间
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// 最后修改时间
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    fn new(id: u32, description: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            description,
            status: TaskStatus::Todo,
            created_at: now,
            updated_at: now,
        }
    }

    /// 刷新 updated_at，保证严格递增（时钟精度不够或回拨时顺延 1µs）
    fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

/// 任务存储：内存列表 + 写穿的 JSON 文件
#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
}

impl TaskStore {
    /// 打开（加载）指定路径的任务文件
    ///
    /// 文件不存在视为空列表；文件存在但内容无法解析则返回错误。
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self {
            path: path.into(),
            tasks: Vec::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// 任务文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 重新从文件加载任务列表
    pub fn load(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }

        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "task file missing, starting empty");
            self.tasks = Vec::new();
            return Ok(());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let tasks: Vec<Task> = serde_json::from_str(&content)?;
        validate(&tasks)?;
        self.tasks = tasks;
        tracing::debug!(path = %self.path.display(), count = self.tasks.len(), "loaded tasks");
        Ok(())
    }

    /// 写入成功后才替换内存列表，失败时内存保持原样
    fn commit(&mut self, tasks: Vec<Task>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }

        let content = to_json_pretty(&tasks)?;
        std::fs::write(&self.path, content)?;
        tracing::debug!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        self.tasks = tasks;
        Ok(())
    }

    /// 下一个任务 ID：当前最大 ID + 1
    fn next_id(&self) -> Result<u32> {
        self.tasks
            .iter()
            .map(|t| t.id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| TrackerError::invalid_data("task id space exhausted"))
    }

    fn position(&self, id: u32) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// 添加任务
    pub fn add(&mut self, description: impl Into<String>) -> Result<Task> {
        let task = Task::new(self.next_id()?, description.into());
        let mut tasks = self.tasks.clone();
        tasks.push(task.clone());
        self.commit(tasks)?;
        tracing::info!(id = task.id, "added task");
        Ok(task)
    }

    /// 所有任务（插入顺序）
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    /// 按 ID 查找任务
    pub fn get(&self, id: u32) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// 按状态过滤（保持原顺序）
    pub fn list_by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    /// 更新描述和状态；任务不存在时返回 None 且不写文件
    pub fn update(
        &mut self,
        id: u32,
        description: impl Into<String>,
        status: TaskStatus,
    ) -> Result<Option<Task>> {
        let description = description.into();
        let updated = self.modify(id, |task| {
            task.description = description;
            task.status = status;
        })?;
        if updated.is_some() {
            tracing::info!(id, status = %status, "updated task");
        }
        Ok(updated)
    }

    /// 只更新状态；任务不存在时返回 None 且不写文件
    pub fn update_status(&mut self, id: u32, status: TaskStatus) -> Result<Option<Task>> {
        let updated = self.modify(id, |task| task.status = status)?;
        if updated.is_some() {
            tracing::info!(id, status = %status, "updated task status");
        }
        Ok(updated)
    }

    fn modify(&mut self, id: u32, apply: impl FnOnce(&mut Task)) -> Result<Option<Task>> {
        let Some(idx) = self.position(id) else {
            return Ok(None);
        };

        let mut tasks = self.tasks.clone();
        apply(&mut tasks[idx]);
        tasks[idx].touch();
        let updated = tasks[idx].clone();

        self.commit(tasks)?;
        Ok(Some(updated))
    }

    /// 删除任务，返回被删除的任务；不存在时返回 None 且不写文件
    pub fn delete(&mut self, id: u32) -> Result<Option<Task>> {
        let Some(idx) = self.position(id) else {
            return Ok(None);
        };

        let mut tasks = self.tasks.clone();
        let removed = tasks.remove(idx);
        self.commit(tasks)?;
        tracing::info!(id, "deleted task");
        Ok(Some(removed))
    }
}

/// 检查加载的数据：ID 为正且不重复，updated_at 不早于 created_at
fn validate(tasks: &[Task]) -> Result<()> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if task.id == 0 {
            return Err(TrackerError::invalid_data("task id must be positive"));
        }
        if !seen.insert(task.id) {
            return Err(TrackerError::invalid_data(format!("duplicate task id {}", task.id)));
        }
        if task.updated_at < task.created_at {
            return Err(TrackerError::invalid_data(format!(
                "task {} updated_at is earlier than created_at",
                task.id
            )));
        }
    }
    Ok(())
}

/// 4 空格缩进的 JSON
fn to_json_pretty(tasks: &[Task]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    tasks.serialize(&mut ser)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, TaskStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::open(dir.path().join("Task-Tracker").join("tasks.json")).unwrap();
        (dir, store)
    }

    fn file_content(store: &TaskStore) -> String {
        std::fs::read_to_string(store.path()).unwrap()
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("todo".parse::<TaskStatus>().unwrap(), TaskStatus::Todo);
        assert_eq!(" In-Progress ".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("DONE".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert!(matches!(
            "in_progress".parse::<TaskStatus>(),
            Err(TrackerError::InvalidStatus(_))
        ));
        assert!("".parse::<TaskStatus>().is_err());

        for status in TaskStatus::ALL {
            assert_eq!(status.to_string().parse::<TaskStatus>().unwrap(), status);
        }
        assert_eq!(TaskStatus::InProgress.to_string(), "in-progress");
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let (dir, store) = temp_store();
        assert!(store.list().is_empty());
        // 目录已创建，但文件要等到第一次写入
        assert!(dir.path().join("Task-Tracker").is_dir());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_open_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, "{ not a task list").unwrap();
        let err = TaskStore::open(&path).unwrap_err();
        assert!(matches!(err, TrackerError::JsonParse(_)));

        std::fs::write(&path, r#"[{"id": 1, "description": "x", "status": "later",
            "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"}]"#)
            .unwrap();
        assert!(TaskStore::open(&path).is_err());
    }

    #[test]
    fn test_add_assigns_next_id() {
        let (_dir, mut store) = temp_store();
        for i in 1..=3 {
            let task = store.add(format!("task {}", i)).unwrap();
            assert_eq!(task.id, i);
            assert_eq!(task.status, TaskStatus::Todo);
            assert_eq!(task.created_at, task.updated_at);
        }
        assert_eq!(store.list().len(), 3);
        assert!(store.path().exists());
    }

    #[test]
    fn test_ids_stay_unique_after_delete() {
        let (_dir, mut store) = temp_store();
        store.add("a").unwrap();
        store.add("b").unwrap();
        store.add("c").unwrap();
        store.delete(1).unwrap();

        let task = store.add("d").unwrap();
        assert_eq!(task.id, 4);
        let ids: Vec<u32> = store.list().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn test_round_trip() {
        let (_dir, mut store) = temp_store();
        store.add("buy milk").unwrap();
        store.add("write report").unwrap();
        store.add("call mom").unwrap();
        store.update_status(2, TaskStatus::InProgress).unwrap();
        store.update(3, "call mom tonight", TaskStatus::Done).unwrap();

        let reloaded = TaskStore::open(store.path()).unwrap();
        assert_eq!(reloaded.list(), store.list());
    }

    #[test]
    fn test_file_format() {
        let (_dir, mut store) = temp_store();
        store.add("buy milk").unwrap();
        store.update_status(1, TaskStatus::InProgress).unwrap();

        let value: serde_json::Value = serde_json::from_str(&file_content(&store)).unwrap();
        let tasks = value.as_array().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0]["id"], 1);
        assert_eq!(tasks[0]["description"], "buy milk");
        assert_eq!(tasks[0]["status"], "in-progress");
        assert!(tasks[0]["created_at"].is_string());
        assert!(tasks[0]["updated_at"].is_string());
        assert!(file_content(&store).contains("\n    {"));
    }

    #[test]
    fn test_loads_naive_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(
            &path,
            r#"[
    {
        "id": 1,
        "description": "legacy",
        "status": "done",
        "created_at": "2024-05-01T09:30:00.123456",
        "updated_at": "2024-05-02T10:00:00.654321"
    }
]"#,
        )
        .unwrap();

        let store = TaskStore::open(&path).unwrap();
        let task = store.get(1).unwrap();
        assert_eq!(task.status, TaskStatus::Done);
        assert!(task.updated_at > task.created_at);
    }

    #[test]
    fn test_update() {
        let (_dir, mut store) = temp_store();
        store.add("first").unwrap();
        store.add("second").unwrap();
        let before = store.get(1).unwrap().clone();
        let other = store.get(2).unwrap().clone();

        let updated = store.update(1, "first, revised", TaskStatus::Done).unwrap().unwrap();
        assert_eq!(updated.description, "first, revised");
        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(updated.created_at, before.created_at);
        assert!(updated.updated_at > before.updated_at);
        assert_eq!(store.get(1), Some(&updated));
        assert_eq!(store.get(2), Some(&other));
    }

    #[test]
    fn test_update_status_keeps_description() {
        let (_dir, mut store) = temp_store();
        store.add("  spaced  description ").unwrap();
        let before = store.get(1).unwrap().clone();

        let updated = store.update_status(1, TaskStatus::InProgress).unwrap().unwrap();
        assert_eq!(updated.description, before.description);
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert!(updated.updated_at > before.updated_at);

        // done 可以回到 todo
        store.update_status(1, TaskStatus::Done).unwrap();
        let back = store.update_status(1, TaskStatus::Todo).unwrap().unwrap();
        assert_eq!(back.status, TaskStatus::Todo);
    }

    #[test]
    fn test_delete_preserves_order() {
        let (_dir, mut store) = temp_store();
        for name in ["a", "b", "c", "d"] {
            store.add(name).unwrap();
        }

        let removed = store.delete(2).unwrap().unwrap();
        assert_eq!(removed.description, "b");
        let names: Vec<&str> = store.list().iter().map(|t| t.description.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "d"]);

        assert!(store.delete(2).unwrap().is_none());
    }

    #[test]
    fn test_missing_id_does_not_write() {
        let (_dir, mut store) = temp_store();
        store.add("only").unwrap();
        let content = file_content(&store);
        let modified = std::fs::metadata(store.path()).unwrap().modified().unwrap();

        assert!(store.get(42).is_none());
        assert!(store.update(42, "x", TaskStatus::Done).unwrap().is_none());
        assert!(store.update_status(42, TaskStatus::Done).unwrap().is_none());
        assert!(store.delete(42).unwrap().is_none());

        assert_eq!(file_content(&store), content);
        assert_eq!(std::fs::metadata(store.path()).unwrap().modified().unwrap(), modified);
    }

    #[test]
    fn test_list_by_status() {
        let (_dir, mut store) = temp_store();
        for name in ["a", "b", "c", "d", "e"] {
            store.add(name).unwrap();
        }
        store.update_status(2, TaskStatus::Done).unwrap();
        store.update_status(4, TaskStatus::InProgress).unwrap();

        let todo: Vec<u32> = store.list_by_status(TaskStatus::Todo).iter().map(|t| t.id).collect();
        assert_eq!(todo, vec![1, 3, 5]);
        let done: Vec<u32> = store.list_by_status(TaskStatus::Done).iter().map(|t| t.id).collect();
        assert_eq!(done, vec![2]);
    }

    fn write_raw(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, body).unwrap();
        path
    }

    fn raw_task(id: u64, created_at: &str, updated_at: &str) -> String {
        format!(
            r#"{{"id": {}, "description": "t", "status": "todo", "created_at": "{}", "updated_at": "{}"}}"#,
            id, created_at, updated_at
        )
    }

    #[test]
    fn test_failed_save_leaves_memory_unchanged() {
        let (_dir, mut store) = temp_store();
        store.add("a").unwrap();
        store.add("b").unwrap();
        let before = store.list().to_vec();

        // 目标路径变成目录，写入必然失败
        std::fs::remove_file(store.path()).unwrap();
        std::fs::create_dir(store.path()).unwrap();

        assert!(store.add("c").is_err());
        assert!(store.update(1, "changed", TaskStatus::Done).is_err());
        assert!(store.update_status(2, TaskStatus::InProgress).is_err());
        assert!(store.delete(1).is_err());
        assert_eq!(store.list(), &before[..]);
    }

    #[test]
    fn test_add_fails_when_id_space_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let ts = "2024-01-01T00:00:00Z";
        let path = write_raw(&dir, &format!("[{}]", raw_task(u32::MAX as u64, ts, ts)));
        let mut store = TaskStore::open(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        let err = store.add("one more").unwrap_err();
        assert!(matches!(err, TrackerError::InvalidData(_)));
        assert_eq!(store.list().len(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_load_rejects_inconsistent_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let early = "2024-01-01T00:00:00Z";
        let late = "2024-01-02T00:00:00Z";

        let cases = [
            format!("[{}]", raw_task(0, early, early)),
            format!("[{}, {}]", raw_task(3, early, early), raw_task(3, early, late)),
            format!("[{}]", raw_task(1, late, early)),
        ];
        for body in &cases {
            let path = write_raw(&dir, body);
            let err = TaskStore::open(&path).unwrap_err();
            assert!(matches!(err, TrackerError::InvalidData(_)), "accepted {}", body);
        }
    }

    #[test]
    fn test_buy_milk_scenario() {
        let (_dir, mut store) = temp_store();

        let task = store.add("buy milk").unwrap();
        assert_eq!(task.id, 1);
        assert_eq!(task.description, "buy milk");
        assert_eq!(task.status, TaskStatus::Todo);

        let updated = store.update_status(1, TaskStatus::Done).unwrap().unwrap();
        assert_eq!(store.get(1).unwrap().status, TaskStatus::Done);
        assert!(updated.updated_at > task.updated_at);

        store.delete(1).unwrap().unwrap();
        assert!(store.list().is_empty());
        assert_eq!(TaskStore::open(store.path()).unwrap().list().len(), 0);
    }
}
