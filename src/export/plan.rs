//! Export plan: the course tree in package order.
//!
//! The plan is built once per export call. It sorts modules, lessons and
//! blocks by their `order` field, checks id uniqueness, assigns each lesson
//! its path segment, and collects non-fatal warnings. Module and lesson ids
//! must also stay distinct once reduced to path segments, since descriptor
//! identifiers are built from them.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::manifest::{LessonItem, ModuleItem, ResourceRef};
use crate::model::{Block, BlockContent, Course, Lesson, Module, Resource};
use crate::util::path_segment;

/// A lesson with everything the exporters need, in plan order.
#[derive(Debug)]
pub struct LessonEntry<'a> {
    /// Position in [`CoursePlan::lessons`].
    pub index: usize,
    pub module: &'a Module,
    pub lesson: &'a Lesson,
    /// File-system safe form of the lesson id.
    pub segment: String,
    pub blocks: Vec<&'a Block>,
    /// Resources that have a file name or URL.
    pub resources: Vec<&'a Resource>,
}

/// A module and the range of its lessons in the flat lesson list.
#[derive(Debug)]
pub struct ModulePlan<'a> {
    pub module: &'a Module,
    pub lessons: std::ops::Range<usize>,
}

#[derive(Debug)]
pub struct CoursePlan<'a> {
    course: &'a Course,
    modules: Vec<ModulePlan<'a>>,
    lessons: Vec<LessonEntry<'a>>,
    warnings: Vec<String>,
}

impl<'a> CoursePlan<'a> {
    pub fn new(course: &'a Course) -> Result<Self> {
        let mut modules: Vec<&Module> = course.modules.iter().collect();
        modules.sort_by_key(|m| m.order);

        let mut module_ids = HashSet::new();
        let mut lesson_ids = HashSet::new();
        let mut segments: HashMap<String, &str> = HashMap::new();
        let mut module_segments: HashMap<String, &str> = HashMap::new();

        let mut plan = CoursePlan {
            course,
            modules: Vec::with_capacity(modules.len()),
            lessons: Vec::with_capacity(course.lesson_count()),
            warnings: Vec::new(),
        };

        for module in modules {
            if !module_ids.insert(module.id.as_str()) {
                return Err(Error::DuplicateId {
                    kind: "module",
                    id: module.id.clone(),
                });
            }
            let module_segment = path_segment(&module.id);
            if let Some(other) = module_segments.insert(module_segment.clone(), module.id.as_str()) {
                return Err(Error::DuplicateId {
                    kind: "module path",
                    id: format!(
                        "{module_segment} (modules \"{other}\" and \"{}\")",
                        module.id
                    ),
                });
            }
            if module.lessons.is_empty() {
                plan.warnings.push(format!(
                    "Module \"{}\" has no lessons and was skipped",
                    module.title
                ));
            }

            let start = plan.lessons.len();
            for lesson in module.ordered_lessons() {
                if !lesson_ids.insert(lesson.id.as_str()) {
                    return Err(Error::DuplicateId {
                        kind: "lesson",
                        id: lesson.id.clone(),
                    });
                }

                let segment = path_segment(&lesson.id);
                if let Some(other) = segments.insert(segment.clone(), lesson.id.as_str()) {
                    return Err(Error::DuplicateId {
                        kind: "lesson path",
                        id: format!("{segment} (lessons \"{other}\" and \"{}\")", lesson.id),
                    });
                }

                let entry = plan.lesson_entry(module, lesson, segment);
                plan.lessons.push(entry);
            }
            plan.modules.push(ModulePlan {
                module,
                lessons: start..plan.lessons.len(),
            });
        }

        Ok(plan)
    }

    fn lesson_entry(
        &mut self,
        module: &'a Module,
        lesson: &'a Lesson,
        segment: String,
    ) -> LessonEntry<'a> {
        let blocks = lesson.ordered_blocks();
        if blocks.is_empty() {
            self.warnings
                .push(format!("Lesson \"{}\" has no content blocks", lesson.title));
        }

        let mut unknown: Vec<&str> = Vec::new();
        for block in &blocks {
            if let BlockContent::Unknown { tag, .. } = &block.content
                && !unknown.contains(&tag.as_str())
            {
                unknown.push(tag);
            }
        }
        for tag in unknown {
            self.warnings.push(format!(
                "Lesson \"{}\": unsupported block type \"{tag}\" rendered as a placeholder",
                lesson.title
            ));
        }

        let mut resources = Vec::with_capacity(lesson.resources.len());
        for resource in &lesson.resources {
            if resource.is_present() {
                resources.push(resource);
            } else {
                self.warnings.push(format!(
                    "Lesson \"{}\": resource \"{}\" has no file name or URL and was skipped",
                    lesson.title, resource.id
                ));
            }
        }

        LessonEntry {
            index: self.lessons.len(),
            module,
            lesson,
            segment,
            blocks,
            resources,
        }
    }

    pub fn course(&self) -> &'a Course {
        self.course
    }

    pub fn modules(&self) -> &[ModulePlan<'a>] {
        &self.modules
    }

    /// Every lesson, module order first, then lesson order.
    pub fn lessons(&self) -> &[LessonEntry<'a>] {
        &self.lessons
    }

    pub fn module_lessons(&self, module: &ModulePlan<'a>) -> &[LessonEntry<'a>] {
        &self.lessons[module.lessons.clone()]
    }

    pub fn previous(&self, entry: &LessonEntry<'a>) -> Option<&LessonEntry<'a>> {
        entry.index.checked_sub(1).and_then(|i| self.lessons.get(i))
    }

    pub fn next(&self, entry: &LessonEntry<'a>) -> Option<&LessonEntry<'a>> {
        self.lessons.get(entry.index + 1)
    }

    pub fn lesson_ids(&self) -> Vec<String> {
        self.lessons.iter().map(|e| e.lesson.id.clone()).collect()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Module/lesson outline for the descriptor builders.
    ///
    /// `launch` maps a lesson to its package-relative launch path and
    /// `files` to any additional files that belong to it.
    pub fn outline<L, F>(&self, launch: L, files: F) -> Vec<ModuleItem>
    where
        L: Fn(&LessonEntry<'a>) -> String,
        F: Fn(&LessonEntry<'a>) -> Vec<String>,
    {
        self.modules
            .iter()
            .map(|plan| ModuleItem {
                id: plan.module.id.clone(),
                title: plan.module.title.clone(),
                description: plan.module.description.clone(),
                lessons: self
                    .module_lessons(plan)
                    .iter()
                    .map(|entry| LessonItem {
                        id: entry.lesson.id.clone(),
                        title: entry.lesson.title.clone(),
                        description: entry.lesson.description.clone(),
                        launch: launch(entry),
                        files: files(entry),
                        resources: entry.resources.iter().map(|r| resource_ref(r)).collect(),
                        duration_minutes: entry.lesson.duration,
                    })
                    .collect(),
            })
            .collect()
    }
}

fn resource_ref(resource: &Resource) -> ResourceRef {
    ResourceRef {
        id: resource.id.clone(),
        kind: resource.kind.clone(),
        url: resource.url.clone(),
        mime_type: resource.mime_type.clone(),
        filename: resource.filename.clone(),
        size: resource.size,
    }
}
