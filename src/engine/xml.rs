//! Built-in targets engine
//!
//! Understands the literal subset of the targets format that pre-build
//! definitions typically need: static `<PropertyGroup>`s, `<Target>`s with
//! `DependsOnTargets`, and the `PropertyGroup`, `Message`, `Warning` and `Error`
//! tasks inside them. Property values are taken verbatim. Conditions, imports,
//! items and `$(...)` style expressions are rejected when the file is loaded so
//! that a definition is never half-understood.

use super::{
    BuildEngine, BuildEvent, BuildLogger, DefinitionProject, EngineError, MessageImportance,
};
use crate::fs::FileSystem;
use crate::properties::PropertySet;
use roxmltree::{Document, Node};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const EXPRESSION_MARKERS: [&str; 3] = ["$(", "@(", "%("];

pub struct XmlTargetsEngine {
    fs: Arc<dyn FileSystem>,
}

impl XmlTargetsEngine {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl BuildEngine for XmlTargetsEngine {
    fn load(&self, path: &Path) -> Result<Box<dyn DefinitionProject>, EngineError> {
        let content = self.fs.read_to_string(path).map_err(|e| EngineError::Read {
            path: path.to_path_buf(),
            message: format!("{:#}", e),
        })?;

        let project = XmlTargetsProject::parse(path, &content)?;
        debug!(
            path = %path.display(),
            properties = project.properties.len(),
            targets = project.targets.len(),
            "Loaded targets file"
        );
        Ok(Box::new(project))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Task {
    SetProperties(Vec<(String, String)>),
    Message {
        text: String,
        importance: MessageImportance,
    },
    Warning(String),
    Error(String),
}

#[derive(Debug, Clone)]
struct TargetDef {
    name: String,
    depends_on: Vec<String>,
    tasks: Vec<Task>,
}

#[derive(Debug)]
pub(crate) struct XmlTargetsProject {
    path: PathBuf,
    properties: PropertySet,
    targets: Vec<TargetDef>,
    default_targets: Vec<String>,
}

impl XmlTargetsProject {
    pub(crate) fn parse(path: &Path, content: &str) -> Result<Self, EngineError> {
        let doc = Document::parse(content).map_err(|e| EngineError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let root = doc.root_element();
        if root.tag_name().name() != "Project" {
            return Err(EngineError::Parse {
                path: path.to_path_buf(),
                message: format!(
                    "root element is <{}>, expected <Project>",
                    root.tag_name().name()
                ),
            });
        }

        let parser = Parser { path };
        parser.reject_condition(root)?;

        let mut properties = PropertySet::new();
        let mut targets: Vec<TargetDef> = Vec::new();

        for child in root.children().filter(|n| n.is_element()) {
            match child.tag_name().name() {
                "PropertyGroup" => {
                    for (name, value) in parser.property_group(child)? {
                        properties.set(&name, &value);
                    }
                }
                "Target" => {
                    let target = parser.target(child)?;
                    // Later definitions of a target replace earlier ones
                    targets.retain(|t| !t.name.eq_ignore_ascii_case(&target.name));
                    targets.push(target);
                }
                other => return Err(parser.unsupported(format!("<{}>", other))),
            }
        }

        let default_targets = match root.attribute("DefaultTargets") {
            Some(list) => {
                parser.reject_expression(list)?;
                split_list(list)
            }
            None => targets.first().map(|t| vec![t.name.clone()]).unwrap_or_default(),
        };

        Ok(Self {
            path: path.to_path_buf(),
            properties,
            targets,
            default_targets,
        })
    }

    fn find_target(&self, name: &str) -> Option<&TargetDef> {
        self.targets
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Runs `name` after its dependencies. Returns `Ok(false)` once an `Error`
    /// task fired; nothing after that point executes.
    fn run_target(
        &mut self,
        name: &str,
        done: &mut HashSet<String>,
        in_progress: &mut Vec<String>,
        logger: &mut dyn BuildLogger,
    ) -> Result<bool, EngineError> {
        let key = name.to_ascii_lowercase();
        if done.contains(&key) {
            return Ok(true);
        }
        if in_progress.contains(&key) {
            return Err(EngineError::CircularDependency(name.to_string()));
        }

        let target = self
            .find_target(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownTarget(name.to_string()))?;

        in_progress.push(key.clone());
        for dependency in &target.depends_on {
            if !self.run_target(dependency, done, in_progress, logger)? {
                in_progress.pop();
                return Ok(false);
            }
        }

        logger.log(&BuildEvent::TargetStarted { name: &target.name });
        let mut succeeded = true;
        for task in &target.tasks {
            match task {
                Task::SetProperties(pairs) => {
                    for (prop, value) in pairs {
                        self.properties.set(prop, value);
                    }
                }
                Task::Message { text, importance } => logger.log(&BuildEvent::Message {
                    text,
                    importance: *importance,
                }),
                Task::Warning(text) => logger.log(&BuildEvent::Warning { text }),
                Task::Error(text) => {
                    logger.log(&BuildEvent::Error { text });
                    succeeded = false;
                    break;
                }
            }
        }
        logger.log(&BuildEvent::TargetFinished {
            name: &target.name,
            succeeded,
        });

        in_progress.pop();
        done.insert(key);
        Ok(succeeded)
    }
}

impl DefinitionProject for XmlTargetsProject {
    fn path(&self) -> &Path {
        &self.path
    }

    fn set_property(&mut self, name: &str, value: &str) {
        self.properties.set(name, value);
    }

    fn properties(&self) -> &PropertySet {
        &self.properties
    }

    fn build(
        &mut self,
        target: Option<&str>,
        logger: &mut dyn BuildLogger,
    ) -> Result<bool, EngineError> {
        let requested = match target {
            Some(name) => vec![name.to_string()],
            None => self.default_targets.clone(),
        };
        if requested.is_empty() {
            return Err(EngineError::NoTargets);
        }

        let mut done = HashSet::new();
        let mut in_progress = Vec::new();
        let mut succeeded = true;
        for name in &requested {
            if !self.run_target(name, &mut done, &mut in_progress, logger)? {
                succeeded = false;
                break;
            }
        }

        logger.log(&BuildEvent::BuildFinished { succeeded });
        Ok(succeeded)
    }
}

struct Parser<'p> {
    path: &'p Path,
}

impl Parser<'_> {
    fn unsupported(&self, construct: String) -> EngineError {
        EngineError::Unsupported {
            path: self.path.to_path_buf(),
            construct,
        }
    }

    fn reject_condition(&self, node: Node) -> Result<(), EngineError> {
        if node.attribute("Condition").is_some() {
            return Err(self.unsupported(format!(
                "a Condition on <{}>",
                node.tag_name().name()
            )));
        }
        Ok(())
    }

    fn reject_expression(&self, value: &str) -> Result<(), EngineError> {
        if let Some(marker) = EXPRESSION_MARKERS.iter().find(|m| value.contains(*m)) {
            return Err(self.unsupported(format!("an expression ({}...) in \"{}\"", marker, value)));
        }
        Ok(())
    }

    fn property_group(&self, group: Node) -> Result<Vec<(String, String)>, EngineError> {
        self.reject_condition(group)?;

        let mut pairs = Vec::new();
        for prop in group.children().filter(|n| n.is_element()) {
            self.reject_condition(prop)?;
            if prop.children().any(|n| n.is_element()) {
                return Err(self.unsupported(format!(
                    "nested XML inside property {}",
                    prop.tag_name().name()
                )));
            }

            let value = prop.text().unwrap_or("").trim().to_string();
            self.reject_expression(&value)?;
            pairs.push((prop.tag_name().name().to_string(), value));
        }
        Ok(pairs)
    }

    fn target(&self, node: Node) -> Result<TargetDef, EngineError> {
        self.reject_condition(node)?;

        let name = node
            .attribute("Name")
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| EngineError::Parse {
                path: self.path.to_path_buf(),
                message: "<Target> is missing the Name attribute".to_string(),
            })?
            .to_string();

        let depends_on = match node.attribute("DependsOnTargets") {
            Some(list) => {
                self.reject_expression(list)?;
                split_list(list)
            }
            None => Vec::new(),
        };

        let mut tasks = Vec::new();
        for child in node.children().filter(|n| n.is_element()) {
            let task = match child.tag_name().name() {
                "PropertyGroup" => Task::SetProperties(self.property_group(child)?),
                "Message" => {
                    self.reject_condition(child)?;
                    Task::Message {
                        text: self.text_attribute(child)?,
                        importance: parse_importance(child.attribute("Importance")),
                    }
                }
                "Warning" => {
                    self.reject_condition(child)?;
                    Task::Warning(self.text_attribute(child)?)
                }
                "Error" => {
                    self.reject_condition(child)?;
                    Task::Error(self.text_attribute(child)?)
                }
                other => {
                    return Err(self.unsupported(format!("the task <{}> in target {}", other, name)))
                }
            };
            tasks.push(task);
        }

        Ok(TargetDef {
            name,
            depends_on,
            tasks,
        })
    }

    fn text_attribute(&self, node: Node) -> Result<String, EngineError> {
        let text = node.attribute("Text").unwrap_or("");
        self.reject_expression(text)?;
        Ok(text.to_string())
    }
}

fn parse_importance(value: Option<&str>) -> MessageImportance {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("high") => MessageImportance::High,
        Some("low") => MessageImportance::Low,
        _ => MessageImportance::Normal,
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RecordingLogger;
    use crate::fs::MockFileSystem;

    fn parse(content: &str) -> Result<XmlTargetsProject, EngineError> {
        XmlTargetsProject::parse(Path::new("/sln/after.App.sln.targets"), content)
    }

    const HOOK: &str = r#"
<Project xmlns="http://schemas.microsoft.com/developer/msbuild/2003" DefaultTargets="Build">
  <PropertyGroup>
    <SolutionHook>enabled</SolutionHook>
  </PropertyGroup>
  <Target Name="Prepare">
    <Message Text="preparing" Importance="low" />
  </Target>
  <Target Name="Build" DependsOnTargets="Prepare">
    <PropertyGroup>
      <CustomAfterMicrosoftCommonTargets>C:\hooks\after.targets</CustomAfterMicrosoftCommonTargets>
      <BarBaz>2</BarBaz>
    </PropertyGroup>
    <Message Text="hook applied" Importance="high" />
  </Target>
  <Target Name="Clean">
    <Warning Text="nothing to clean" />
  </Target>
</Project>
"#;

    #[test]
    fn test_static_properties_loaded_in_order() {
        let project = parse(HOOK).unwrap();
        assert_eq!(project.properties().get("SolutionHook"), Some("enabled"));
        assert_eq!(project.properties().len(), 1);
        assert_eq!(project.default_targets, vec!["Build".to_string()]);
    }

    #[test]
    fn test_build_runs_dependencies_first_and_appends_properties() {
        let mut project = parse(HOOK).unwrap();
        let mut logger = RecordingLogger::default();

        let ok = project.build(Some("Build"), &mut logger).unwrap();

        assert!(ok);
        assert_eq!(
            logger.lines,
            vec![
                "start Prepare",
                "message preparing",
                "finish Prepare true",
                "start Build",
                "message hook applied",
                "finish Build true",
                "done true",
            ]
        );
        let names: Vec<&str> = project.properties().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["SolutionHook", "CustomAfterMicrosoftCommonTargets", "BarBaz"]
        );
    }

    #[test]
    fn test_target_names_are_case_insensitive() {
        let mut project = parse(HOOK).unwrap();
        let mut logger = RecordingLogger::default();
        assert!(project.build(Some("clean"), &mut logger).unwrap());
        assert!(logger.lines.contains(&"warning nothing to clean".to_string()));
    }

    #[test]
    fn test_default_targets_used_without_explicit_target() {
        let mut project = parse(HOOK).unwrap();
        let mut logger = RecordingLogger::default();
        assert!(project.build(None, &mut logger).unwrap());
        assert!(project.properties().contains("BarBaz"));
    }

    #[test]
    fn test_first_target_is_default_when_attribute_missing() {
        let project = parse(r#"<Project><Target Name="A"/><Target Name="B"/></Project>"#).unwrap();
        assert_eq!(project.default_targets, vec!["A".to_string()]);
    }

    #[test]
    fn test_unknown_target() {
        let mut project = parse(HOOK).unwrap();
        let mut logger = RecordingLogger::default();
        let err = project.build(Some("Deploy"), &mut logger).unwrap_err();
        assert!(matches!(err, EngineError::UnknownTarget(ref t) if t == "Deploy"));
    }

    #[test]
    fn test_no_targets() {
        let mut project = parse("<Project />").unwrap();
        let mut logger = RecordingLogger::default();
        assert!(matches!(
            project.build(None, &mut logger),
            Err(EngineError::NoTargets)
        ));
    }

    #[test]
    fn test_error_task_stops_build() {
        let mut project = parse(
            r#"<Project>
  <Target Name="Build">
    <PropertyGroup><CustomBefore>1</CustomBefore></PropertyGroup>
    <Error Text="boom" />
    <PropertyGroup><CustomAfter>1</CustomAfter></PropertyGroup>
  </Target>
</Project>"#,
        )
        .unwrap();
        let mut logger = RecordingLogger::default();

        let ok = project.build(Some("Build"), &mut logger).unwrap();

        assert!(!ok);
        assert!(project.properties().contains("CustomBefore"));
        assert!(!project.properties().contains("CustomAfter"));
        assert_eq!(logger.lines.last().unwrap(), "done false");
    }

    #[test]
    fn test_circular_dependency() {
        let mut project = parse(
            r#"<Project>
  <Target Name="A" DependsOnTargets="B" />
  <Target Name="B" DependsOnTargets="A" />
</Project>"#,
        )
        .unwrap();
        let mut logger = RecordingLogger::default();
        assert!(matches!(
            project.build(Some("A"), &mut logger),
            Err(EngineError::CircularDependency(_))
        ));
    }

    #[test]
    fn test_shared_dependency_runs_once() {
        let mut project = parse(
            r#"<Project>
  <Target Name="Common"><Message Text="common" /></Target>
  <Target Name="A" DependsOnTargets="Common" />
  <Target Name="B" DependsOnTargets="Common;A" />
</Project>"#,
        )
        .unwrap();
        let mut logger = RecordingLogger::default();
        project.build(Some("B"), &mut logger).unwrap();

        let runs = logger.lines.iter().filter(|l| *l == "message common").count();
        assert_eq!(runs, 1);
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        assert!(matches!(
            parse("<Project><PropertyGroup></Project>"),
            Err(EngineError::Parse { .. })
        ));
    }

    #[test]
    fn test_wrong_root_is_parse_error() {
        let err = parse("<Solution />").unwrap_err();
        assert!(err.to_string().contains("expected <Project>"));
    }

    #[test]
    fn test_conditions_are_rejected() {
        let err = parse(
            r#"<Project>
  <PropertyGroup Condition="'$(BuildingInsideVisualStudio)' == 'true'">
    <CustomFoo>1</CustomFoo>
  </PropertyGroup>
</Project>"#,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Unsupported { .. }));
    }

    #[test]
    fn test_expressions_are_rejected() {
        let err = parse(
            r#"<Project><PropertyGroup><CustomFoo>$(Configuration)</CustomFoo></PropertyGroup></Project>"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("$("));
    }

    #[test]
    fn test_imports_are_rejected() {
        let err = parse(r#"<Project><Import Project="other.targets" /></Project>"#).unwrap_err();
        assert!(err.to_string().contains("<Import>"));
    }

    #[test]
    fn test_engine_load_reads_through_filesystem() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("sln/after.App.sln.targets", HOOK);
        let engine = XmlTargetsEngine::new(fs);

        let project = engine
            .load(Path::new("/mock/sln/after.App.sln.targets"))
            .unwrap();
        assert_eq!(project.path(), Path::new("/mock/sln/after.App.sln.targets"));
        assert_eq!(project.properties().get("SolutionHook"), Some("enabled"));
    }

    #[test]
    fn test_engine_load_missing_file() {
        let engine = XmlTargetsEngine::new(Arc::new(MockFileSystem::new()));
        assert!(matches!(
            engine.load(Path::new("/mock/missing.targets")),
            Err(EngineError::Read { .. })
        ));
    }
}
