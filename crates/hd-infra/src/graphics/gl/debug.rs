// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Routing of `KHR_debug` messages into the `log` facade.

use log::Level;

/// Log level of a debug message, from its type.
pub fn message_level(message_type: u32) -> Level {
    match message_type {
        glow::DEBUG_TYPE_ERROR => Level::Error,
        glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR
        | glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR
        | glow::DEBUG_TYPE_PORTABILITY
        | glow::DEBUG_TYPE_PERFORMANCE => Level::Warn,
        _ => Level::Info,
    }
}

fn source_name(source: u32) -> &'static str {
    match source {
        glow::DEBUG_SOURCE_API => "API",
        glow::DEBUG_SOURCE_WINDOW_SYSTEM => "window system",
        glow::DEBUG_SOURCE_SHADER_COMPILER => "shader compiler",
        glow::DEBUG_SOURCE_THIRD_PARTY => "third party",
        glow::DEBUG_SOURCE_APPLICATION => "application",
        _ => "other",
    }
}

fn type_name(message_type: u32) -> &'static str {
    match message_type {
        glow::DEBUG_TYPE_ERROR => "error",
        glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "deprecated behavior",
        glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "undefined behavior",
        glow::DEBUG_TYPE_PORTABILITY => "portability",
        glow::DEBUG_TYPE_PERFORMANCE => "performance",
        glow::DEBUG_TYPE_MARKER => "marker",
        glow::DEBUG_TYPE_PUSH_GROUP => "push group",
        glow::DEBUG_TYPE_POP_GROUP => "pop group",
        _ => "other",
    }
}

fn severity_name(severity: u32) -> &'static str {
    match severity {
        glow::DEBUG_SEVERITY_HIGH => "high",
        glow::DEBUG_SEVERITY_MEDIUM => "medium",
        glow::DEBUG_SEVERITY_LOW => "low",
        glow::DEBUG_SEVERITY_NOTIFICATION => "notification",
        _ => "unknown",
    }
}

/// Formats a debug message the way it is logged.
pub fn format_message(source: u32, message_type: u32, id: u32, severity: u32, message: &str) -> String {
    format!(
        "GL {} [source: {}, id: {id}, severity: {}]: {}",
        type_name(message_type),
        source_name(source),
        severity_name(severity),
        message.trim_end()
    )
}

/// Callback installed with `glDebugMessageCallback`.
pub fn route_message(source: u32, message_type: u32, id: u32, severity: u32, message: &str) {
    log::log!(
        message_level(message_type),
        "{}",
        format_message(source, message_type, id, severity, message)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_levels() {
        assert_eq!(message_level(glow::DEBUG_TYPE_ERROR), Level::Error);
        assert_eq!(message_level(glow::DEBUG_TYPE_PERFORMANCE), Level::Warn);
        assert_eq!(message_level(glow::DEBUG_TYPE_PORTABILITY), Level::Warn);
        assert_eq!(message_level(glow::DEBUG_TYPE_MARKER), Level::Info);
        assert_eq!(message_level(glow::DEBUG_TYPE_OTHER), Level::Info);
    }

    #[test]
    fn test_message_format() {
        let text = format_message(
            glow::DEBUG_SOURCE_SHADER_COMPILER,
            glow::DEBUG_TYPE_ERROR,
            7,
            glow::DEBUG_SEVERITY_HIGH,
            "bad things\n",
        );
        assert_eq!(
            text,
            "GL error [source: shader compiler, id: 7, severity: high]: bad things"
        );
    }
}
