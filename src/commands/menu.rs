use serde::Serialize;

/// One line of the static menu manifest. `path` is slash separated; the
/// last segment is the item label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Command {
        path: &'static str,
        command: &'static str,
        shortcut: Option<&'static str>,
    },
    Separator {
        menu: &'static str,
    },
}

pub const MENU_MANIFEST: &[MenuItem] = &[
    MenuItem::Command {
        path: "File/Open...",
        command: "file.open",
        shortcut: Some("Ctrl+O"),
    },
    MenuItem::Command {
        path: "File/Import/Raw...",
        command: "file.import.raw",
        shortcut: None,
    },
    MenuItem::Command {
        path: "Edit/Invert",
        command: "edit.invert",
        shortcut: Some("Ctrl+Shift+I"),
    },
    MenuItem::Command {
        path: "Image/Stacks/Next Slice",
        command: "image.stacks.next",
        shortcut: Some(">"),
    },
    MenuItem::Command {
        path: "Image/Stacks/Previous Slice",
        command: "image.stacks.previous",
        shortcut: Some("<"),
    },
    MenuItem::Separator {
        menu: "Image/Stacks",
    },
    MenuItem::Command {
        path: "Image/Stacks/Orthogonal Views",
        command: "image.stacks.orthogonal_views",
        shortcut: Some("Ctrl+Shift+H"),
    },
    MenuItem::Command {
        path: "Process/Smooth",
        command: "process.smooth",
        shortcut: Some("Ctrl+Shift+S"),
    },
    MenuItem::Command {
        path: "Analyze/Measure",
        command: "analyze.measure",
        shortcut: Some("Ctrl+M"),
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuNode {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub separator: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    fn submenu(label: &str) -> Self {
        Self {
            label: label.to_string(),
            command: None,
            shortcut: None,
            separator: false,
            children: Vec::new(),
        }
    }

    fn separator() -> Self {
        Self {
            separator: true,
            ..Self::submenu("")
        }
    }
}

/// Nested menus in manifest order. Submenus appear where their first item
/// is listed.
pub fn menu_tree() -> Vec<MenuNode> {
    let mut roots = Vec::new();
    for item in MENU_MANIFEST {
        match *item {
            MenuItem::Command {
                path,
                command,
                shortcut,
            } => {
                let mut segments = path.split('/').collect::<Vec<_>>();
                let Some(label) = segments.pop() else {
                    continue;
                };
                let parent = submenu_at(&mut roots, &segments);
                parent.push(MenuNode {
                    command: Some(command.to_string()),
                    shortcut: shortcut.map(str::to_string),
                    ..MenuNode::submenu(label)
                });
            }
            MenuItem::Separator { menu } => {
                let segments = menu.split('/').collect::<Vec<_>>();
                submenu_at(&mut roots, &segments).push(MenuNode::separator());
            }
        }
    }
    roots
}

fn submenu_at<'a>(roots: &'a mut Vec<MenuNode>, segments: &[&str]) -> &'a mut Vec<MenuNode> {
    let mut level = roots;
    for segment in segments {
        let index = match level
            .iter()
            .position(|node| !node.separator && node.command.is_none() && node.label == *segment)
        {
            Some(index) => index,
            None => {
                level.push(MenuNode::submenu(segment));
                level.len() - 1
            }
        };
        level = &mut level[index].children;
    }
    level
}
