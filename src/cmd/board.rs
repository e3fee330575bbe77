//! Board client commands: `taskboard board|add|update|delete|move`.

use anyhow::{Context, Result};
use taskboard::client::BoardClient;
use taskboard::config::TaskboardConfig;
use taskboard::web::api::MoveTaskRequest;
use taskboard_common::{Board, NewTask, Priority, Task, TaskPatch};

/// `--url` if given, otherwise the configured server address.
pub fn server_url(config: &TaskboardConfig, url: Option<String>) -> String {
    url.unwrap_or_else(|| config.server.base_url())
}

fn parse_priority(priority: Option<&str>) -> Result<Option<Priority>> {
    priority
        .map(|p| p.parse::<Priority>().map_err(anyhow::Error::msg))
        .transpose()
        .context("Invalid --priority")
}

pub fn new_task(
    title: String,
    description: Option<String>,
    column: Option<String>,
    priority: Option<&str>,
    tags: Vec<String>,
) -> Result<NewTask> {
    Ok(NewTask {
        title,
        description,
        priority: parse_priority(priority)?,
        tags,
        column_id: column,
    })
}

/// Fields the `update` command was asked to change.
#[derive(Debug, Default)]
pub struct UpdateArgs {
    pub title: Option<String>,
    pub description: Option<String>,
    pub clear_description: bool,
    pub column: Option<String>,
    pub priority: Option<String>,
    pub clear_priority: bool,
    pub tags: Vec<String>,
}

pub fn task_patch(args: UpdateArgs) -> Result<TaskPatch> {
    let description = if args.clear_description {
        Some(None)
    } else {
        args.description.map(Some)
    };
    let priority = if args.clear_priority {
        Some(None)
    } else {
        parse_priority(args.priority.as_deref())?.map(Some)
    };
    Ok(TaskPatch {
        title: args.title,
        description,
        priority,
        tags: if args.tags.is_empty() {
            None
        } else {
            Some(args.tags)
        },
        column_id: args.column,
    })
}

pub async fn cmd_board(url: &str) -> Result<()> {
    let client = BoardClient::new(url);
    let board = client.fetch_board().await?;
    print!("{}", render_board(&board));
    Ok(())
}

pub async fn cmd_add(url: &str, input: NewTask) -> Result<()> {
    let client = BoardClient::new(url);
    let task = client.create_task(&input).await?;
    println!("Created {} in {}", task.id, task.column_id);
    Ok(())
}

pub async fn cmd_update(url: &str, id: &str, patch: TaskPatch) -> Result<()> {
    let client = BoardClient::new(url);
    let task = client.update_task(id, &patch).await?;
    println!("Updated {}", render_task(&task));
    Ok(())
}

pub async fn cmd_delete(url: &str, id: &str) -> Result<()> {
    let client = BoardClient::new(url);
    client.delete_task(id).await?;
    println!("Deleted {}", id);
    Ok(())
}

pub async fn cmd_move(
    url: &str,
    id: &str,
    from: String,
    from_index: usize,
    to: String,
    to_index: usize,
) -> Result<()> {
    let client = BoardClient::new(url);
    let request = MoveTaskRequest {
        from_column_id: from,
        from_index,
        to_column_id: to.clone(),
        to_index,
    };
    let response = client.move_task(id, &request).await?;
    if response.moved {
        println!("Moved {} to {}[{}]", id, to, to_index);
    } else {
        println!("{} is already at {}[{}]", id, to, to_index);
    }
    Ok(())
}

fn render_task(task: &Task) -> String {
    let mut line = format!("{}  {}", task.id, task.title);
    if let Some(priority) = task.priority {
        line.push_str(&format!("  [{}]", priority.as_str()));
    }
    if !task.tags.is_empty() {
        line.push_str(&format!("  #{}", task.tags.join(" #")));
    }
    line
}

pub fn render_board(board: &Board) -> String {
    let mut out = String::new();
    for column in &board.columns {
        let tasks = board.tasks_in(&column.id);
        out.push_str(&format!("{} ({})\n", column.title, tasks.len()));
        for task in tasks {
            out.push_str(&format!(
                "  {}  (updated {})\n",
                render_task(task),
                task.updated_at.format("%Y-%m-%d %H:%M")
            ));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_board_lists_columns_in_order() {
        let out = render_board(&Board::seeded());
        let todo = out.find("To Do (1)").unwrap();
        let doing = out.find("In Progress (1)").unwrap();
        let done = out.find("Done (1)").unwrap();
        assert!(todo < doing && doing < done);
        assert!(out.contains("task-1  Research competitors  [high]  #research #marketing"));
    }

    #[test]
    fn test_new_task_parses_priority() {
        let task = new_task("t".into(), None, None, Some("HIGH"), vec![]).unwrap();
        assert_eq!(task.priority, Some(Priority::High));
        assert!(new_task("t".into(), None, None, Some("urgent"), vec![]).is_err());
    }

    #[test]
    fn test_task_patch_empty_tags_keep_existing() {
        let patch = task_patch(UpdateArgs::default()).unwrap();
        assert_eq!(patch, TaskPatch::default());

        let patch = task_patch(UpdateArgs {
            tags: vec!["a".into()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch.tags, Some(vec!["a".to_string()]));
    }

    #[test]
    fn test_task_patch_set_and_clear() {
        let patch = task_patch(UpdateArgs {
            description: Some("details".into()),
            priority: Some("low".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch.description, Some(Some("details".to_string())));
        assert_eq!(patch.priority, Some(Some(Priority::Low)));

        let patch = task_patch(UpdateArgs {
            clear_description: true,
            clear_priority: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.priority, Some(None));
    }

    #[test]
    fn test_server_url_prefers_flag() {
        let config = TaskboardConfig::default();
        assert_eq!(server_url(&config, None), "http://127.0.0.1:3001");
        assert_eq!(
            server_url(&config, Some("http://board:9000".into())),
            "http://board:9000"
        );
    }
}
