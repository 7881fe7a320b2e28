use std::fmt;
use std::fmt::Formatter;
use std::sync::{Arc, Mutex};
use owo_colors::OwoColorize;
use crate::config::Page;
use crate::errors::DocumentError;
use crate::models::bms_status::FIELD_IDS;

/// Class tagging the containers toggled by the page switcher
pub const CONTENT_PAGE_CLASS: &str = "content-page";

/// Id of the connection indicator
pub const STATUS_TEXT_ID: &str = "status-text";

/// Document shared between the polling routines and the renderer
pub type SharedDocument = Arc<Mutex<Document>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Default,
    Hidden,
    Flex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Green,
    Red,
    Orange,
}

impl Color {
    /// Returns the text styled for a color terminal, orange is shown as yellow
    ///
    /// # Arguments
    ///
    /// * 'text' - the text to style
    pub fn paint(&self, text: &str) -> String {
        match self {
            Color::Green => text.green().to_string(),
            Color::Red => text.red().to_string(),
            Color::Orange => text.yellow().to_string(),
        }
    }
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for Color {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Color::Green => write!(f, "green"),
            Color::Red => write!(f, "red"),
            Color::Orange => write!(f, "orange"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    pub id: String,
    pub class: Option<String>,
    pub parent: Option<String>,
    pub label: Option<String>,
    pub text: String,
    pub color: Option<Color>,
    pub visibility: Visibility,
}

impl Element {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            class: None,
            parent: None,
            label: None,
            text: String::new(),
            color: None,
            visibility: Visibility::Default,
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn is_visible(&self) -> bool {
        self.visibility != Visibility::Hidden
    }
}

/// In-memory display document, elements are addressed by id and kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the dashboard document: the connection indicator, one alert line per
    /// polling routine and a content page container per configured page holding its fields
    ///
    /// # Arguments
    ///
    /// * 'pages' - configured pages
    /// * 'alert_ids' - ids of the alert lines shown below the pages
    pub fn from_layout(pages: &[Page], alert_ids: &[&str]) -> Self {
        let mut document = Document::new();
        document.insert(Element::new(STATUS_TEXT_ID).with_label("BMS"));

        for page in pages {
            let page_id = page_id(&page.name);
            document.insert(Element::new(&page_id).with_class(CONTENT_PAGE_CLASS).with_label(&page.title));
            for (id, label) in &page.fields {
                document.insert(Element::new(id).with_parent(&page_id).with_label(label));
            }
        }

        for id in alert_ids {
            document.insert(Element::new(id));
        }

        document
    }

    /// Adds an element, replacing any element with the same id
    ///
    /// # Arguments
    ///
    /// * 'element' - the element to add
    pub fn insert(&mut self, element: Element) {
        match self.position(&element.id) {
            Some(i) => self.elements[i] = element,
            None => self.elements.push(element),
        }
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.element(id).map(|e| e.text.as_str())
    }

    pub fn set_text(&mut self, id: &str, text: &str) -> Result<(), DocumentError> {
        self.element_mut(id)?.text = text.to_string();
        Ok(())
    }

    pub fn set_color(&mut self, id: &str, color: Color) -> Result<(), DocumentError> {
        self.element_mut(id)?.color = Some(color);
        Ok(())
    }

    pub fn set_visibility(&mut self, id: &str, visibility: Visibility) -> Result<(), DocumentError> {
        self.element_mut(id)?.visibility = visibility;
        Ok(())
    }

    /// Returns ids of all elements tagged with the given class
    ///
    /// # Arguments
    ///
    /// * 'class' - the class to look for
    pub fn ids_by_class(&self, class: &str) -> Vec<String> {
        self.elements.iter()
            .filter(|e| e.class.as_deref() == Some(class))
            .map(|e| e.id.clone())
            .collect()
    }

    /// Returns the ids the polling routines write to that are not present in the document
    ///
    pub fn missing_targets(&self) -> Vec<String> {
        FIELD_IDS.iter()
            .chain(std::iter::once(&STATUS_TEXT_ID))
            .filter(|id| !self.contains(id))
            .map(|id| id.to_string())
            .collect()
    }

    /// Renders the document for a terminal: the indicator, the visible content pages
    /// with their fields, and any other top level element with text
    ///
    /// # Arguments
    ///
    /// * 'colored' - whether to style colored elements, off for anything but a terminal
    pub fn render(&self, colored: bool) -> String {
        let mut out = String::new();

        for element in self.elements.iter().filter(|e| e.parent.is_none() && e.is_visible()) {
            if element.class.as_deref() == Some(CONTENT_PAGE_CLASS) {
                let caption = format!("{} ", element.label.as_deref().unwrap_or(&element.id));
                out += &format!("{:=<60}\n", caption);
                for child in self.elements.iter().filter(|c| c.parent.as_deref() == Some(element.id.as_str()) && c.is_visible()) {
                    out += &format!("{:<32} {}\n", child.label.as_deref().unwrap_or(&child.id), paint(child, colored));
                }
            } else if !element.text.is_empty() {
                match &element.label {
                    Some(label) => out += &format!("{}: {}\n", label, paint(element, colored)),
                    None => out += &format!("{}\n", paint(element, colored)),
                }
            }
        }

        out
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    fn element_mut(&mut self, id: &str) -> Result<&mut Element, DocumentError> {
        self.elements.iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| DocumentError::MissingElement(id.to_string()))
    }
}

/// Id of the container element for the named page
pub fn page_id(name: &str) -> String {
    format!("page-{}", name)
}

fn paint(element: &Element, colored: bool) -> String {
    match element.color {
        Some(color) if colored => color.paint(&element.text),
        _ => element.text.clone(),
    }
}
