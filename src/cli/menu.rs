//! 交互式菜单
//!
//! 读写都通过泛型 `BufRead` / `Write`，main 里接 stdin/stdout，测试里接内存缓冲。
//! 输入结束（EOF）等同于选择 Exit。

use std::io::{BufRead, Write};

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};

use super::render;
use crate::error::Result;
use crate::storage::tasks::{TaskStatus, TaskStore};

const MENU: &str = "\
Task Tracker
1. Add Task
2. List Tasks
3. List Tasks by Status
4. Update Task
5. Update Task Status
6. Delete Task
7. Exit";

const STATUS_PROMPT: &str = "Enter task status (todo, in-progress, done): ";
const INVALID_STATUS: &str = "Invalid status. Please enter 'todo', 'in-progress', or 'done'.";

pub struct Menu<'a, R, W> {
    store: &'a mut TaskStore,
    input: R,
    output: W,
    clear_screen: bool,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(store: &'a mut TaskStore, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
            clear_screen: true,
        }
    }

    pub fn clear_screen(mut self, enabled: bool) -> Self {
        self.clear_screen = enabled;
        self
    }

    /// 主循环，直到选择 Exit 或输入结束
    pub fn run(&mut self) -> Result<()> {
        tracing::debug!(path = %self.store.path().display(), "starting interactive menu");
        writeln!(self.output, "Welcome to Task Tracker")?;
        writeln!(self.output)?;

        loop {
            writeln!(self.output, "{}", MENU)?;
            let Some(choice) = self.prompt("Enter your choice: ")? else {
                break;
            };

            let keep_going = match choice.trim() {
                "1" => self.add_task()?,
                "2" => self.list_tasks()?,
                "3" => self.list_by_status()?,
                "4" => self.update_task()?,
                "5" => self.update_status()?,
                "6" => self.delete_task()?,
                "7" => false,
                other => {
                    tracing::debug!(choice = other, "invalid menu choice");
                    writeln!(self.output, "Invalid choice")?;
                    true
                }
            };
            if !keep_going {
                break;
            }
        }

        self.output.flush()?;
        Ok(())
    }

    /// 输出提示并读一行；EOF 时返回 None
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn read_description(&mut self) -> Result<Option<String>> {
        let mut message = "Enter task description: ";
        loop {
            let Some(line) = self.prompt(message)? else {
                return Ok(None);
            };
            let description = line.trim();
            if !description.is_empty() {
                return Ok(Some(description.to_string()));
            }
            message = "Description cannot be empty. Enter task description: ";
        }
    }

    fn read_status(&mut self) -> Result<Option<TaskStatus>> {
        loop {
            let Some(line) = self.prompt(STATUS_PROMPT)? else {
                return Ok(None);
            };
            match line.parse::<TaskStatus>() {
                Ok(status) => return Ok(Some(status)),
                Err(_) => writeln!(self.output, "{}", INVALID_STATUS)?,
            }
        }
    }

    /// 空列表时提示并返回 false，避免无限要求输入 ID
    fn has_tasks(&mut self) -> Result<bool> {
        if self.store.list().is_empty() {
            writeln!(self.output, "No tasks yet.")?;
            writeln!(self.output)?;
            return Ok(false);
        }
        Ok(true)
    }

    /// 读取一个已存在的任务 ID，不存在或不是数字时重新提示
    fn read_existing_id(&mut self, first_prompt: &str) -> Result<Option<u32>> {
        let mut message = first_prompt;
        loop {
            let Some(line) = self.prompt(message)? else {
                return Ok(None);
            };
            match line.trim().parse::<u32>() {
                Ok(id) if self.store.get(id).is_some() => return Ok(Some(id)),
                Ok(_) => message = "Task not found. Please enter a valid task id: ",
                Err(_) => message = "Invalid task id. Please enter a number: ",
            }
        }
    }

    fn clear(&mut self) -> Result<()> {
        if self.clear_screen {
            execute!(self.output, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        Ok(())
    }

    // 以下各 action 返回 false 表示输入已结束，需要退出主循环

    fn add_task(&mut self) -> Result<bool> {
        let Some(description) = self.read_description()? else {
            return Ok(false);
        };
        let task = self.store.add(description)?;
        render::write_task(&mut self.output, &task)?;
        writeln!(self.output)?;
        Ok(true)
    }

    fn list_tasks(&mut self) -> Result<bool> {
        self.clear()?;
        render::write_tasks(&mut self.output, self.store.list())?;
        writeln!(self.output)?;
        Ok(true)
    }

    fn list_by_status(&mut self) -> Result<bool> {
        let Some(status) = self.read_status()? else {
            return Ok(false);
        };
        render::write_tasks(&mut self.output, self.store.list_by_status(status))?;
        writeln!(self.output)?;
        Ok(true)
    }

    fn update_task(&mut self) -> Result<bool> {
        if !self.has_tasks()? {
            return Ok(true);
        }
        let Some(id) = self.read_existing_id("Enter task id: ")? else {
            return Ok(false);
        };
        let Some(description) = self.read_description()? else {
            return Ok(false);
        };
        let Some(status) = self.read_status()? else {
            return Ok(false);
        };

        match self.store.update(id, description, status)? {
            Some(task) => render::write_task(&mut self.output, &task)?,
            None => render::write_not_found(&mut self.output, id)?,
        }
        writeln!(self.output)?;
        Ok(true)
    }

    fn update_status(&mut self) -> Result<bool> {
        if !self.has_tasks()? {
            return Ok(true);
        }
        let Some(id) = self.read_existing_id("Enter task id: ")? else {
            return Ok(false);
        };
        let Some(status) = self.read_status()? else {
            return Ok(false);
        };

        match self.store.update_status(id, status)? {
            Some(task) => render::write_task(&mut self.output, &task)?,
            None => render::write_not_found(&mut self.output, id)?,
        }
        writeln!(self.output)?;
        Ok(true)
    }

    fn delete_task(&mut self) -> Result<bool> {
        if !self.has_tasks()? {
            return Ok(true);
        }
        let Some(id) = self.read_existing_id("Enter task id for delete: ")? else {
            return Ok(false);
        };

        match self.store.delete(id)? {
            Some(task) => {
                write!(self.output, "Deleted ")?;
                render::write_task(&mut self.output, &task)?;
            }
            None => render::write_not_found(&mut self.output, id)?,
        }
        writeln!(self.output)?;
        Ok(true)
    }
}
