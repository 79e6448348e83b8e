//! Testing utilities for the remedy workspace
//!
//! Shared fixtures and a scripted generative-service fake.

#![allow(missing_docs)]

use async_trait::async_trait;
use remedy_catalog::BugDescriptor;
use remedy_engine::{GenerativeService, ServiceError};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One scripted reply of the fake service
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    Transport(String),
    RateLimited,
    Status(u16),
}

impl ScriptedReply {
    fn into_result(self) -> Result<String, ServiceError> {
        match self {
            ScriptedReply::Text(text) => Ok(text),
            ScriptedReply::Transport(detail) => Err(ServiceError::Transport(detail)),
            ScriptedReply::RateLimited => Err(ServiceError::RateLimited),
            ScriptedReply::Status(status) => Err(ServiceError::Status { status }),
        }
    }
}

/// Deterministic fake of the generative service
///
/// Pops one scripted reply per call; once the script runs out, the last
/// reply repeats forever. Never touches the network.
pub struct ScriptedService {
    script: Mutex<Vec<ScriptedReply>>,
    last: Mutex<Option<ScriptedReply>>,
    calls: AtomicU32,
}

impl ScriptedService {
    pub fn new(script: Vec<ScriptedReply>) -> Self {
        let mut script = script;
        script.reverse();
        Self {
            script: Mutex::new(script),
            last: Mutex::new(None),
            calls: AtomicU32::new(0),
        }
    }

    /// A service that answers every call with the same text
    pub fn always(text: impl Into<String>) -> Self {
        Self::new(vec![ScriptedReply::Text(text.into())])
    }

    /// A service that fails every call at the transport level
    pub fn always_failing() -> Self {
        Self::new(vec![ScriptedReply::Transport("connection refused".into())])
    }

    /// Number of calls made so far
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeService for ScriptedService {
    async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut script = self.script.lock().unwrap();
        let reply = match script.pop() {
            Some(reply) => {
                *self.last.lock().unwrap() = Some(reply.clone());
                reply
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| ScriptedReply::Transport("script exhausted".into())),
        };
        reply.into_result()
    }
}

/// An accepting reply for the given bug: one fresh line in its first hint
pub fn accepting_reply(bug: &BugDescriptor) -> ScriptedReply {
    let hint = bug
        .file_hints
        .first()
        .cloned()
        .unwrap_or_else(|| "fix.txt".to_string());
    let (fence, line) = if hint.ends_with(".py") {
        ("python", format!("remedied_{} = True", bug.id.as_str().replace('-', "_")))
    } else {
        ("typescript", format!("const remedied = '{}';", bug.id))
    };
    ScriptedReply::Text(format!(
        "File: {hint}\n```{fence}\n{line}\n```\nRationale: applies the cataloged fix concept.\n"
    ))
}

const TODO_LIST_TSX: &str = concat!(
    "import React, { useEffect, useState } from 'react';\n",
    "import { apiCall } from '../services/api';\n",
    "\n",
    "export function TodoList() {\n",
    "  const [todos, setTodos] = useState([]);\n",
    "  useEffect(() => {\n",
    "    fetchTodos();\n",
    "  });\n",
    "  const handleUpdate = async (id: number, updates: object) => {\n",
    "    await apiCall('PUT', `/todos/${id}/`, updates);\n",
    "  };\n",
    "  return null;\n",
    "}\n",
);

const API_TS: &str = concat!(
    "export const apiCall = async (method: string, path: string, body?: object) => {\n",
    "  return fetch(path, { method, body: JSON.stringify(body) });\n",
    "};\n",
);

const VIEWS_PY: &str = concat!(
    "from rest_framework import viewsets\n",
    "from .models import Todo\n",
    "\n",
    "class TodoViewSet(viewsets.ModelViewSet):\n",
    "    def get_queryset(self):\n",
    "        return Todo.objects.all()\n",
);

const SERIALIZERS_PY: &str = concat!(
    "from rest_framework import serializers\n",
    "from .models import Todo\n",
    "\n",
    "class TodoSerializer(serializers.ModelSerializer):\n",
    "    class Meta:\n",
    "        model = Todo\n",
    "        fields = ['id', 'title', 'completed', 'created_at']\n",
);

/// Write the demo todo-app tree the reference catalog hints at
pub fn write_todo_app_fixture(root: &Path) {
    let files: &[(&str, &str)] = &[
        ("frontend/src/components/TodoList.tsx", TODO_LIST_TSX),
        ("frontend/src/services/api.ts", API_TS),
        ("backend/todos/views.py", VIEWS_PY),
        ("backend/todos/serializers.py", SERIALIZERS_PY),
    ];

    for (relative, contents) in files {
        let full = root.join(relative);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("fixture dir");
        }
        std::fs::write(full, contents).expect("fixture file");
    }
}

/// Fixture tree inside a fresh temp dir
pub fn todo_app_tempdir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    write_todo_app_fixture(dir.path());
    dir
}
