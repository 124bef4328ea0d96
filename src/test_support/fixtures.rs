//! Test fixtures for creating sample projects and toolchain installations.

use std::path::{Path, PathBuf};

use super::MockFileSystem;

/// Build a package file with an `Objects` container.
///
/// Each object is `(Type, path, is_reference)`.
pub fn package_xml(root: &str, objects: &[(&str, &str, bool)]) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <?AutomationStudio FileVersion=\"4.9\"?>\n\
         <{root} xmlns=\"http://br-automation.co.at/AS/Package\">\n  <Objects>\n"
    );
    for (kind, path, is_reference) in objects {
        let reference = if *is_reference { " Reference=\"true\"" } else { "" };
        xml.push_str(&format!(
            "    <Object Type=\"{kind}\"{reference}>{path}</Object>\n"
        ));
    }
    xml.push_str(&format!("  </Objects>\n</{root}>\n"));
    xml
}

/// Build a unit package with a `Files` container.
pub fn unit_xml(root: &str, sub_type: Option<&str>, files: &[&str]) -> String {
    let sub_type = sub_type
        .map(|s| format!(" SubType=\"{s}\""))
        .unwrap_or_default();
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <?AutomationStudio FileVersion=\"4.9\"?>\n\
         <{root}{sub_type} xmlns=\"http://br-automation.co.at/AS/{root}\">\n  <Files>\n"
    );
    for file in files {
        xml.push_str(&format!("    <File>{file}</File>\n"));
    }
    xml.push_str(&format!("  </Files>\n</{root}>\n"));
    xml
}

/// Build a `Cpu.pkg`. `build` holds extra attributes of the `Build` element.
pub fn cpu_xml(module_id: &str, gcc_version: &str, build: &[(&str, &str)]) -> String {
    let attributes: String = build
        .iter()
        .map(|(name, value)| format!(" {name}=\"{value}\""))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <?AutomationStudio FileVersion=\"4.9\"?>\n\
         <Cpu xmlns=\"http://br-automation.co.at/AS/Cpu\">\n\
         \x20 <Objects />\n\
         \x20 <Configuration ModuleId=\"{module_id}\">\n\
         \x20   <AutomationRuntime Version=\"B4.90\" />\n\
         \x20   <Build GccVersion=\"{gcc_version}\"{attributes} />\n\
         \x20 </Configuration>\n\
         </Cpu>\n"
    )
}

/// Build a `LastUser.set` naming the active configuration.
pub fn last_user_xml(configuration: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <ProjectSettings>\n\
         \x20 <ConfigurationManager ActiveConfigurationName=\"{configuration}\" />\n\
         </ProjectSettings>\n"
    )
}

/// Build a `*.apj` project file.
pub fn project_xml(working_version: &str, default_includes: bool) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <?AutomationStudio Version=4.9.3.144 WorkingVersion=\"{working_version}\"?>\n\
         <Project Version=\"1.0.0\" xmlns=\"http://br-automation.co.at/AS/Project\">\n\
         \x20 <ANSIC DefaultIncludesInHeader=\"{default_includes}\" />\n\
         </Project>\n"
    )
}

/// Add an Automation Studio installation directory with its build
/// executable. Returns the installation directory.
pub fn write_studio_installation(fs: &MockFileSystem, root: &str, dir_name: &str) -> PathBuf {
    let dir = Path::new(root).join(dir_name);
    fs.add_file(dir.join("bin-en").join("BR.AS.Build.exe"), "");
    dir
}

/// Add a bundled gcc installation with one executable per machine.
pub fn write_gcc_installation(
    fs: &MockFileSystem,
    studio_dir: &Path,
    version_dir: &str,
    machines: &[&str],
) -> PathBuf {
    let root = studio_dir.join("AS").join("gnuinst").join(version_dir);
    for machine in machines {
        fs.add_file(root.join("bin").join(format!("{machine}-gcc.exe")), "");
    }
    root
}

/// A complete sample project.
///
/// Layout:
///
/// ```text
/// <name>.apj
/// Logical/Package.pkg
/// Logical/Global.var
/// Logical/Main/IEC.prg              IEC program
/// Logical/Control/ANSIC.prg         C program
/// Logical/Libraries/Package.pkg
/// Logical/Libraries/MyLib/ANSIC.lby C library
/// Physical/Physical.pkg             Sim, Hw
/// Physical/Sim/X20CP1586/Cpu.pkg    SG4/IA32, gcc 4.1.2
/// Physical/Hw/X20CP0484/Cpu.pkg     SG4/Arm, gcc 6.3.0
/// ```
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    root: PathBuf,
    name: String,
    working_version: String,
    default_includes: bool,
    active_configuration: Option<String>,
    overrides: Vec<(String, String)>,
}

impl ProjectFixture {
    pub fn new(root: impl Into<PathBuf>, name: &str) -> Self {
        ProjectFixture {
            root: root.into(),
            name: name.to_string(),
            working_version: "4.9".to_string(),
            default_includes: false,
            active_configuration: None,
            overrides: Vec::new(),
        }
    }

    /// Write a `LastUser.set` naming this configuration.
    pub fn with_active_configuration(mut self, name: &str) -> Self {
        self.active_configuration = Some(name.to_string());
        self
    }

    /// Set `DefaultIncludesInHeader`.
    pub fn default_includes(mut self, enabled: bool) -> Self {
        self.default_includes = enabled;
        self
    }

    pub fn working_version(mut self, version: &str) -> Self {
        self.working_version = version.to_string();
        self
    }

    /// Add or replace a file, relative to the project root.
    pub fn with_file(mut self, relative: &str, content: impl Into<String>) -> Self {
        self.overrides.push((relative.to_string(), content.into()));
        self
    }

    /// Path of the project file.
    pub fn project_file(&self) -> PathBuf {
        self.root.join(format!("{}.apj", self.name))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn files(&self) -> Vec<(String, String)> {
        let mut files = vec![
            (
                format!("{}.apj", self.name),
                project_xml(&self.working_version, self.default_includes),
            ),
            (
                "Logical/Package.pkg".to_string(),
                package_xml(
                    "Package",
                    &[
                        ("Program", "Main", false),
                        ("Program", "Control", false),
                        ("Package", "Libraries", false),
                        ("File", "Global.var", false),
                    ],
                ),
            ),
            ("Logical/Global.var".to_string(), "VAR\nEND_VAR\n".to_string()),
            (
                "Logical/Main/IEC.prg".to_string(),
                unit_xml("Program", Some("IEC"), &["Main.st"]),
            ),
            (
                "Logical/Main/Main.st".to_string(),
                "PROGRAM _CYCLIC\nEND_PROGRAM\n".to_string(),
            ),
            (
                "Logical/Control/ANSIC.prg".to_string(),
                unit_xml("Program", Some("ANSIC"), &["main.c"]),
            ),
            (
                "Logical/Control/main.c".to_string(),
                "void _CYCLIC ProgramCyclic(void) {}\n".to_string(),
            ),
            (
                "Logical/Libraries/Package.pkg".to_string(),
                package_xml("Package", &[("Library", "MyLib", false)]),
            ),
            (
                "Logical/Libraries/MyLib/ANSIC.lby".to_string(),
                unit_xml("Library", Some("ANSIC"), &["mylib.c"]),
            ),
            (
                "Logical/Libraries/MyLib/mylib.c".to_string(),
                "int mylib(void) { return 0; }\n".to_string(),
            ),
            (
                "Physical/Physical.pkg".to_string(),
                package_xml(
                    "Physical",
                    &[("Configuration", "Sim", false), ("Configuration", "Hw", false)],
                ),
            ),
            (
                "Physical/Sim/Config.pkg".to_string(),
                package_xml("Configuration", &[("Cpu", "X20CP1586", false)]),
            ),
            (
                "Physical/Sim/X20CP1586/Cpu.pkg".to_string(),
                cpu_xml(
                    "X20CP1586",
                    "4.1.2",
                    &[
                        ("AnsicIncludeDirectories", r"\Logical\Libraries\MyLib"),
                        ("AdditionalBuildOptions", "-Wall"),
                        ("AnsicAdditionalBuildOptions", "-DSIM"),
                    ],
                ),
            ),
            (
                "Physical/Hw/Config.pkg".to_string(),
                package_xml("Configuration", &[("Cpu", "X20CP0484", false)]),
            ),
            (
                "Physical/Hw/X20CP0484/Cpu.pkg".to_string(),
                cpu_xml("X20CP0484", "6.3.0", &[]),
            ),
        ];

        if let Some(active) = &self.active_configuration {
            files.push(("LastUser.set".to_string(), last_user_xml(active)));
        }
        files.extend(self.overrides.iter().cloned());
        files
    }

    /// Write the project into a mock filesystem.
    pub fn write_mock(&self, fs: &MockFileSystem) {
        for (relative, content) in self.files() {
            fs.add_file(self.root.join(relative), content);
        }
    }

    /// Write the project to disk below its root.
    pub fn write_disk(&self) -> std::io::Result<()> {
        for (relative, content) in self.files() {
            let path = self.root.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }
        Ok(())
    }
}
