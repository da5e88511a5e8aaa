//! 任务的文本输出

use std::io::{self, Write};

use chrono::{DateTime, Local, Utc};

use crate::storage::tasks::Task;

fn local_time(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 单行格式：`#1 [todo] buy milk (created ..., updated ...)`
pub fn format_task(task: &Task) -> String {
    format!(
        "#{} [{}] {} (created {}, updated {})",
        task.id,
        task.status,
        task.description,
        local_time(&task.created_at),
        local_time(&task.updated_at)
    )
}

pub fn write_task<W: Write>(out: &mut W, task: &Task) -> io::Result<()> {
    writeln!(out, "{}", format_task(task))
}

pub fn write_tasks<'a, W, I>(out: &mut W, tasks: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Task>,
{
    let mut empty = true;
    for task in tasks {
        write_task(out, task)?;
        empty = false;
    }
    if empty {
        writeln!(out, "No tasks.")?;
    }
    Ok(())
}

pub fn write_not_found<W: Write>(out: &mut W, id: u32) -> io::Result<()> {
    writeln!(out, "Task {} not found", id)
}
