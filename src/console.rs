//! Console presenter
//!
//! Dialogue text lives in template files under the template directory. A
//! template is framed by two `=` rules, colored in the robot's speak color and
//! rendered either as a prompt (followed by a line read from input) or as a
//! plain message.

use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use owo_colors::OwoColorize;

use crate::consts::SPLITTER_WIDTH;
use crate::error::{Error, Result};
use crate::settings::SpeakColor;

/// A loaded template with `${name}` / `$name` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    contents: String,
}

impl Template {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Replace every placeholder with its value from `vars`.
    ///
    /// `$$` renders a literal `$`. A placeholder with no value, or a `$` that
    /// does not start a placeholder, is an error.
    pub fn substitute(&self, vars: &[(&str, &str)]) -> Result<String> {
        let mut out = String::with_capacity(self.contents.len());
        let mut rest = self.contents.as_str();

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            if let Some(stripped) = after.strip_prefix('$') {
                out.push('$');
                rest = stripped;
                continue;
            }

            let (key, consumed) = if let Some(braced) = after.strip_prefix('{') {
                let end = braced.find('}').ok_or_else(|| self.invalid("unclosed ${"))?;
                let key = &braced[..end];
                if !is_identifier(key) {
                    return Err(self.invalid(&format!("bad placeholder ${{{}}}", key)));
                }
                (key, end + 2)
            } else {
                let len = identifier_len(after);
                if len == 0 {
                    return Err(self.invalid("'$' not followed by a placeholder name"));
                }
                (&after[..len], len)
            };

            let value = vars
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| *v)
                .ok_or_else(|| Error::MissingPlaceholder {
                    template: self.name.clone(),
                    key: key.to_string(),
                })?;
            out.push_str(value);
            rest = &after[consumed..];
        }
        out.push_str(rest);
        Ok(out)
    }

    fn invalid(&self, reason: &str) -> Error {
        Error::InvalidTemplate {
            template: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

fn identifier_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(*c == '_' || c.is_ascii_alphanumeric()))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && identifier_len(s) == s.len()
}

/// Frame template text between two rules and apply the speak color
pub fn frame(contents: &str, color: SpeakColor) -> String {
    let splitter = "=".repeat(SPLITTER_WIDTH);
    let contents = contents.trim_end_matches(['\r', '\n']);
    let framed = format!("{splitter}\n{contents}\n{splitter}\n");
    match color.ansi() {
        Some(c) => framed.color(c).to_string(),
        None => framed,
    }
}

/// Renders templates to `output` and reads answers from `input`
pub struct Console<R, W> {
    template_dir: PathBuf,
    color: SpeakColor,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(template_dir: impl Into<PathBuf>, color: SpeakColor, input: R, output: W) -> Self {
        Self {
            template_dir: template_dir.into(),
            color,
            input,
            output,
        }
    }

    /// Path of template `name`, which must exist
    pub fn find_template(&self, name: &str) -> Result<PathBuf> {
        let path = self.template_dir.join(name);
        if !path.is_file() {
            return Err(Error::TemplateNotFound {
                name: name.to_string(),
            });
        }
        Ok(path)
    }

    /// Load template `name`, framed and colored
    pub fn get_template(&self, name: &str) -> Result<Template> {
        let path = self.find_template(name)?;
        let contents = fs::read_to_string(&path)?;
        Ok(Template::new(name, frame(&contents, self.color)))
    }

    /// Render `name` and read one line of input (without its line ending)
    pub fn prompt(&mut self, name: &str, vars: &[(&str, &str)]) -> Result<String> {
        let text = self.get_template(name)?.substitute(vars)?;
        self.output.write_all(text.as_bytes())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::InputClosed);
        }
        let answer = line.trim_end_matches(['\r', '\n']).to_string();
        log::debug!("{} -> {:?}", name, answer);
        Ok(answer)
    }

    /// Render `name` as a message
    pub fn say(&mut self, name: &str, vars: &[(&str, &str)]) -> Result<()> {
        let text = self.get_template(name)?.substitute(vars)?;
        writeln!(self.output, "{}", text)?;
        self.output.flush()?;
        Ok(())
    }

    /// Give back the output sink
    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn template_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.txt"), "Hi, I am ${robot_name}.\n\n").unwrap();
        dir
    }

    #[test]
    fn test_substitute_forms() {
        let t = Template::new("t", "${a} and $b cost $$5, ${a}_x");
        let out = t.substitute(&[("a", "one"), ("b", "two")]).unwrap();
        assert_eq!(out, "one and two cost $5, one_x");
    }

    #[test]
    fn test_substitute_missing_key() {
        let t = Template::new("greeting.txt", "Hello ${user_name}");
        match t.substitute(&[("robot_name", "Roboko")]) {
            Err(Error::MissingPlaceholder { template, key }) => {
                assert_eq!(template, "greeting.txt");
                assert_eq!(key, "user_name");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_substitute_invalid() {
        assert!(matches!(
            Template::new("t", "price: $5").substitute(&[]),
            Err(Error::InvalidTemplate { .. })
        ));
        assert!(matches!(
            Template::new("t", "${open").substitute(&[]),
            Err(Error::InvalidTemplate { .. })
        ));
        assert!(matches!(
            Template::new("t", "${two words}").substitute(&[]),
            Err(Error::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn test_frame_plain() {
        let rule = "=".repeat(60);
        assert_eq!(
            frame("hello\n\n", SpeakColor::Plain),
            format!("{rule}\nhello\n{rule}\n")
        );
    }

    #[test]
    fn test_frame_colored() {
        let framed = frame("hello", SpeakColor::Green);
        assert!(framed.starts_with("\x1b[32m"));
        assert!(framed.contains("hello"));
    }

    #[test]
    fn test_missing_template() {
        let dir = template_dir();
        let console = Console::new(dir.path(), SpeakColor::Plain, Cursor::new(""), Vec::new());
        assert!(console.find_template("hello.txt").is_ok());
        match console.get_template("nope.txt") {
            Err(e @ Error::TemplateNotFound { .. }) => assert_eq!(e.to_string(), "Could not find nope.txt"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_prompt_reads_line() {
        let dir = template_dir();
        let mut console = Console::new(dir.path(), SpeakColor::Plain, Cursor::new("alice\r\nbob\n"), Vec::new());
        assert_eq!(console.prompt("hello.txt", &[("robot_name", "Roboko")]).unwrap(), "alice");
        assert_eq!(console.prompt("hello.txt", &[("robot_name", "Roboko")]).unwrap(), "bob");
        assert!(matches!(
            console.prompt("hello.txt", &[("robot_name", "Roboko")]),
            Err(Error::InputClosed)
        ));

        let out = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(out.matches("Hi, I am Roboko.").count(), 3);
    }

    #[test]
    fn test_say_writes_message() {
        let dir = template_dir();
        let mut console = Console::new(dir.path(), SpeakColor::Plain, Cursor::new(""), Vec::new());
        console.say("hello.txt", &[("robot_name", "Roboko")]).unwrap();
        let rule = "=".repeat(60);
        assert_eq!(
            String::from_utf8(console.into_output()).unwrap(),
            format!("{rule}\nHi, I am Roboko.\n{rule}\n\n")
        );
    }
}
