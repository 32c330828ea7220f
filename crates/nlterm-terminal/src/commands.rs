//! Built-in command implementations.

use std::collections::BTreeMap;

use nlterm_types::error::{Result, TermError};

use crate::fs_ops::{self, ListOptions};
use crate::interpreter::{Arity, Builtin, CommandOutput, CommandRegistry, Environment};
use crate::result::TargetOutcome;
use crate::session::Strategy;

/// Number of entries `history` prints.
const HISTORY_SHOWN: usize = 20;

/// Register every builtin into the given registry.
pub fn register_builtins(reg: &mut CommandRegistry) {
    reg.register(Box::new(HelpCmd));
    reg.register(Box::new(PwdCmd));
    reg.register(Box::new(LsCmd));
    reg.register(Box::new(CdCmd));
    reg.register(Box::new(MkdirCmd));
    reg.register(Box::new(RmdirCmd));
    reg.register(Box::new(RmCmd));
    reg.register(Box::new(TouchCmd));
    reg.register(Box::new(CatCmd));
    reg.register(Box::new(EchoCmd));
    reg.register(Box::new(EditCmd));
    reg.register(Box::new(CpCmd));
    reg.register(Box::new(MvCmd));
    reg.register(Box::new(CountCmd));
    reg.register(Box::new(HistoryCmd));
    reg.register(Box::new(ClearCmd));
    reg.register(Box::new(ExitCmd));
    reg.register(Box::new(AiCmd));
    reg.register(Box::new(VersionCmd));
}

/// Run `op` on every target, collecting one outcome each. A failing target
/// never stops the rest.
fn each_target<F>(op: &str, targets: &[&str], mut f: F) -> CommandOutput
where
    F: FnMut(&str) -> Result<String>,
{
    let outcomes = targets
        .iter()
        .map(|&t| match f(t) {
            Ok(detail) => TargetOutcome::ok(t, detail),
            Err(e) => TargetOutcome::failed(op, t, &e),
        })
        .collect();
    CommandOutput::Targets(outcomes)
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

struct HelpCmd;
impl Builtin for HelpCmd {
    fn name(&self) -> &str {
        "help"
    }
    fn description(&self) -> &str {
        "List available commands"
    }
    fn usage(&self) -> &str {
        "help [command]"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if let Some(&wanted) = args.first() {
            let wanted = wanted.to_lowercase();
            let info = env
                .commands
                .iter()
                .find(|c| c.name == wanted || c.aliases.iter().any(|a| *a == wanted))
                .ok_or_else(|| TermError::InvalidArgument(format!("{wanted}: no such command")))?;
            let mut text = format!("{} - {}\nusage: {}", info.name, info.description, info.usage);
            if !info.aliases.is_empty() {
                text.push_str(&format!("\naliases: {}", info.aliases.join(", ")));
            }
            return Ok(CommandOutput::Text(text));
        }

        let mut groups: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for info in env.commands {
            let name = if info.aliases.is_empty() {
                info.name.clone()
            } else {
                format!("{}/{}", info.name, info.aliases.join("/"))
            };
            groups
                .entry(info.category.as_str())
                .or_default()
                .push(format!("  {name:<14} {}", info.description));
        }
        let mut lines = Vec::new();
        for (category, cmds) in groups {
            lines.push(format!("{category}:"));
            lines.extend(cmds);
        }
        lines.push(String::new());
        lines.push("Anything else is read as a plain-English request, e.g. \"make a folder named notes\".".to_string());
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// pwd
// ---------------------------------------------------------------------------

struct PwdCmd;
impl Builtin for PwdCmd {
    fn name(&self) -> &str {
        "pwd"
    }
    fn description(&self) -> &str {
        "Print working directory"
    }
    fn usage(&self) -> &str {
        "pwd"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(env.session.cwd().display().to_string()))
    }
}

// ---------------------------------------------------------------------------
// ls
// ---------------------------------------------------------------------------

struct LsCmd;
impl Builtin for LsCmd {
    fn name(&self) -> &str {
        "ls"
    }
    fn aliases(&self) -> &[&str] {
        &["dir"]
    }
    fn description(&self) -> &str {
        "List directory contents"
    }
    fn usage(&self) -> &str {
        "ls [path] [-l] [-a]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn arity(&self) -> Arity {
        Arity::defaulted(1)
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut opts = ListOptions::default();
        let mut path = None;
        for &arg in args {
            match arg.strip_prefix('-') {
                Some(flags) if !flags.is_empty() => {
                    for flag in flags.chars() {
                        match flag {
                            'l' => opts.long = true,
                            'a' => opts.all = true,
                            other => {
                                return Err(TermError::InvalidArgument(format!(
                                    "invalid option -- '{other}'"
                                )));
                            },
                        }
                    }
                },
                _ if path.is_some() => {
                    return Err(TermError::InvalidArgument(format!("extra operand '{arg}'")));
                },
                _ => path = Some(arg),
            }
        }
        let entries = fs_ops::list(env.session, path, opts)?;
        Ok(CommandOutput::Listing {
            entries,
            long: opts.long,
        })
    }
}

// ---------------------------------------------------------------------------
// cd
// ---------------------------------------------------------------------------

struct CdCmd;
impl Builtin for CdCmd {
    fn name(&self) -> &str {
        "cd"
    }
    fn description(&self) -> &str {
        "Change working directory"
    }
    fn usage(&self) -> &str {
        "cd [path|~|-]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn arity(&self) -> Arity {
        Arity::defaulted(1)
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.len() > 1 {
            return Err(TermError::InvalidArgument("too many arguments".to_string()));
        }
        let (from, to) = fs_ops::change_directory(env.session, args.first().copied())?;
        Ok(CommandOutput::DirectoryChanged { from, to })
    }
}

// ---------------------------------------------------------------------------
// mkdir / rmdir
// ---------------------------------------------------------------------------

struct MkdirCmd;
impl Builtin for MkdirCmd {
    fn name(&self) -> &str {
        "mkdir"
    }
    fn description(&self) -> &str {
        "Create directories"
    }
    fn usage(&self) -> &str {
        "mkdir <name...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn arity(&self) -> Arity {
        Arity::required(1)
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let session = &*env.session;
        Ok(each_target("mkdir", args, |name| {
            fs_ops::make_directory(session, name).map(|_| String::new())
        }))
    }
}

struct RmdirCmd;
impl Builtin for RmdirCmd {
    fn name(&self) -> &str {
        "rmdir"
    }
    fn description(&self) -> &str {
        "Remove empty directories (-r: with contents)"
    }
    fn usage(&self) -> &str {
        "rmdir [-r] <name...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn arity(&self) -> Arity {
        Arity::required(1)
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let recursive = args.iter().any(|a| matches!(*a, "-r" | "-R" | "--recursive"));
        let names: Vec<&str> = args
            .iter()
            .copied()
            .filter(|a| !matches!(*a, "-r" | "-R" | "--recursive"))
            .collect();
        if names.is_empty() {
            return Err(TermError::InvalidArgument(format!(
                "missing operand (usage: {})",
                self.usage()
            )));
        }
        let session = &*env.session;
        Ok(each_target("rmdir", &names, |name| {
            fs_ops::remove_directory(session, name, recursive).map(|_| String::new())
        }))
    }
}

// ---------------------------------------------------------------------------
// rm / touch / cat
// ---------------------------------------------------------------------------

struct RmCmd;
impl Builtin for RmCmd {
    fn name(&self) -> &str {
        "rm"
    }
    fn aliases(&self) -> &[&str] {
        &["del"]
    }
    fn description(&self) -> &str {
        "Remove files"
    }
    fn usage(&self) -> &str {
        "rm <name...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn arity(&self) -> Arity {
        Arity::required(1)
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let session = &*env.session;
        Ok(each_target("rm", args, |name| {
            fs_ops::remove_file(session, name).map(|_| String::new())
        }))
    }
}

struct TouchCmd;
impl Builtin for TouchCmd {
    fn name(&self) -> &str {
        "touch"
    }
    fn description(&self) -> &str {
        "Create empty files or update timestamps"
    }
    fn usage(&self) -> &str {
        "touch <name...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn arity(&self) -> Arity {
        Arity::required(1)
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let session = &*env.session;
        Ok(each_target("touch", args, |name| {
            fs_ops::touch(session, name).map(|_| String::new())
        }))
    }
}

struct CatCmd;
impl Builtin for CatCmd {
    fn name(&self) -> &str {
        "cat"
    }
    fn description(&self) -> &str {
        "Print file contents"
    }
    fn usage(&self) -> &str {
        "cat <name...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn arity(&self) -> Arity {
        Arity::required(1)
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let session = &*env.session;
        let headed = args.len() > 1;
        Ok(each_target("cat", args, |name| {
            let content = fs_ops::read_file(session, name)?;
            let content = content.strip_suffix('\n').unwrap_or(&content).to_string();
            Ok(if headed {
                format!("==> {name} <==\n{content}")
            } else {
                content
            })
        }))
    }
}

// ---------------------------------------------------------------------------
// echo / edit
// ---------------------------------------------------------------------------

struct EchoCmd;
impl Builtin for EchoCmd {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "Print text, or write it to a file with '>'"
    }
    fn usage(&self) -> &str {
        "echo <words...> [> file]"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(pos) = args.iter().position(|a| *a == ">") else {
            return Ok(CommandOutput::Text(args.join(" ")));
        };
        let content = args[..pos].join(" ");
        match &args[pos + 1..] {
            [target] => {
                let (path, bytes) = fs_ops::write_file(env.session, &content, target)?;
                Ok(CommandOutput::Written { path, bytes })
            },
            [] => Err(TermError::InvalidArgument(
                "missing file after '>'".to_string(),
            )),
            [_, extra, ..] => Err(TermError::InvalidArgument(format!(
                "extra operand '{extra}' after redirect target"
            ))),
        }
    }
}

struct EditCmd;
impl Builtin for EditCmd {
    fn name(&self) -> &str {
        "edit"
    }
    fn description(&self) -> &str {
        "Replace a file's contents"
    }
    fn usage(&self) -> &str {
        "edit <file> [content...]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn arity(&self) -> Arity {
        Arity::required(1)
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let content = args[1..].join(" ");
        let (path, bytes) = fs_ops::write_file(env.session, &content, args[0])?;
        Ok(CommandOutput::Written { path, bytes })
    }
}

// ---------------------------------------------------------------------------
// cp / mv
// ---------------------------------------------------------------------------

fn two_operands<'a>(args: &[&'a str]) -> Result<(&'a str, &'a str)> {
    match args {
        [src, dst] => Ok((*src, *dst)),
        [_, _, extra, ..] => Err(TermError::InvalidArgument(format!("extra operand '{extra}'"))),
        _ => Err(TermError::InvalidArgument(
            "missing destination operand".to_string(),
        )),
    }
}

struct CpCmd;
impl Builtin for CpCmd {
    fn name(&self) -> &str {
        "cp"
    }
    fn description(&self) -> &str {
        "Copy a file"
    }
    fn usage(&self) -> &str {
        "cp <src> <dst>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn arity(&self) -> Arity {
        Arity::required(2)
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (src, dst) = two_operands(args)?;
        fs_ops::copy(env.session, src, dst)?;
        Ok(CommandOutput::None)
    }
}

struct MvCmd;
impl Builtin for MvCmd {
    fn name(&self) -> &str {
        "mv"
    }
    fn description(&self) -> &str {
        "Move or rename a file or directory"
    }
    fn usage(&self) -> &str {
        "mv <src> <dst>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn arity(&self) -> Arity {
        Arity::required(2)
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (src, dst) = two_operands(args)?;
        fs_ops::move_entry(env.session, src, dst)?;
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// count
// ---------------------------------------------------------------------------

struct CountCmd;
impl Builtin for CountCmd {
    fn name(&self) -> &str {
        "count"
    }
    fn description(&self) -> &str {
        "Count files and directories"
    }
    fn usage(&self) -> &str {
        "count [path]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn arity(&self) -> Arity {
        Arity::defaulted(1)
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let counts = fs_ops::count(env.session, args.first().copied())?;
        Ok(CommandOutput::Counts(counts))
    }
}

// ---------------------------------------------------------------------------
// history / clear / exit
// ---------------------------------------------------------------------------

struct HistoryCmd;
impl Builtin for HistoryCmd {
    fn name(&self) -> &str {
        "history"
    }
    fn description(&self) -> &str {
        "Show recent commands"
    }
    fn usage(&self) -> &str {
        "history"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let history = env.session.history();
        if history.is_empty() {
            return Ok(CommandOutput::Text("(no history)".to_string()));
        }
        let skip = history.len().saturating_sub(HISTORY_SHOWN);
        let lines: Vec<String> = history
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(i, line)| format!("{:>4}  {line}", i + 1))
            .collect();
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

struct ClearCmd;
impl Builtin for ClearCmd {
    fn name(&self) -> &str {
        "clear"
    }
    fn aliases(&self) -> &[&str] {
        &["cls"]
    }
    fn description(&self) -> &str {
        "Clear the screen"
    }
    fn usage(&self) -> &str {
        "clear"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Clear)
    }
}

struct ExitCmd;
impl Builtin for ExitCmd {
    fn name(&self) -> &str {
        "exit"
    }
    fn aliases(&self) -> &[&str] {
        &["quit"]
    }
    fn description(&self) -> &str {
        "Leave the terminal"
    }
    fn usage(&self) -> &str {
        "exit"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Exit)
    }
}

// ---------------------------------------------------------------------------
// ai / version
// ---------------------------------------------------------------------------

struct AiCmd;
impl Builtin for AiCmd {
    fn name(&self) -> &str {
        "ai"
    }
    fn description(&self) -> &str {
        "Show which natural-language resolver is active"
    }
    fn usage(&self) -> &str {
        "ai"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let text = match env.session.strategy() {
            Strategy::Remote => "Natural-language resolver: remote model",
            Strategy::Deterministic => "Natural-language resolver: built-in patterns (remote model unavailable)",
        };
        Ok(CommandOutput::Text(text.to_string()))
    }
}

struct VersionCmd;
impl Builtin for VersionCmd {
    fn name(&self) -> &str {
        "version"
    }
    fn description(&self) -> &str {
        "Show version"
    }
    fn usage(&self) -> &str {
        "version"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(format!(
            "nlterm {}",
            env!("CARGO_PKG_VERSION")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::tokenize;
    use crate::result::{ExecutionResult, Status};
    use crate::session::Session;
    use nlterm_types::error::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, CommandRegistry, Session) {
        let tmp = tempfile::tempdir().unwrap();
        let mut reg = CommandRegistry::new();
        register_builtins(&mut reg);
        let session = Session::new(tmp.path())
            .unwrap()
            .with_home(tmp.path().to_path_buf());
        (tmp, reg, session)
    }

    fn exec(reg: &CommandRegistry, session: &mut Session, line: &str) -> Result<CommandOutput> {
        let cmd = tokenize(line)?.unwrap();
        reg.execute(&cmd, session)
    }

    fn run(reg: &CommandRegistry, session: &mut Session, line: &str) -> ExecutionResult {
        let cmd = tokenize(line).unwrap().unwrap();
        match reg.execute(&cmd, session) {
            Ok(out) => ExecutionResult::from(out),
            Err(e) => ExecutionResult::failure(&cmd.name, &e),
        }
    }

    #[test]
    fn pwd_shows_cwd() {
        let (tmp, reg, mut s) = setup();
        match exec(&reg, &mut s, "pwd").unwrap() {
            CommandOutput::Text(t) => assert_eq!(t, tmp.path().display().to_string()),
            _ => panic!("expected text"),
        }
    }

    #[test]
    fn ls_flags_and_alias() {
        let (tmp, reg, mut s) = setup();
        fs::write(tmp.path().join(".dot"), "").unwrap();
        fs::write(tmp.path().join("seen"), "").unwrap();
        match exec(&reg, &mut s, "DIR -la").unwrap() {
            CommandOutput::Listing { entries, long } => {
                assert!(long);
                assert_eq!(entries.len(), 2);
            },
            _ => panic!("expected listing"),
        }
        let r = run(&reg, &mut s, "ls");
        assert_eq!(r.message, "seen");
    }

    #[test]
    fn ls_unknown_flag_is_invalid() {
        let (_tmp, reg, mut s) = setup();
        let r = run(&reg, &mut s, "ls -z");
        assert_eq!(r.status, Status::Error);
        assert_eq!(r.kind, Some(ErrorKind::InvalidArgument));
        assert_eq!(r.message, "ls: invalid option -- 'z'");
    }

    #[test]
    fn ls_missing_dir_reports_target() {
        let (_tmp, reg, mut s) = setup();
        let r = run(&reg, &mut s, "ls ghost");
        assert_eq!(r.message, "ls: ghost: No such file or directory");
        assert_eq!(r.kind, Some(ErrorKind::NotFound));
    }

    #[test]
    fn cd_changes_and_reports() {
        let (tmp, reg, mut s) = setup();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        match exec(&reg, &mut s, "cd sub").unwrap() {
            CommandOutput::DirectoryChanged { from, to } => {
                assert_eq!(from, tmp.path());
                assert_eq!(to, tmp.path().join("sub"));
            },
            _ => panic!("expected directory change"),
        }
        exec(&reg, &mut s, "cd ..").unwrap();
        assert_eq!(s.cwd(), tmp.path());
    }

    #[test]
    fn mkdir_multi_target_reports_each() {
        let (tmp, reg, mut s) = setup();
        fs::write(tmp.path().join("blocker"), "").unwrap();
        let r = run(&reg, &mut s, "mkdir one blocker/two three");
        assert_eq!(r.status, Status::Ok);
        assert!(tmp.path().join("one").is_dir());
        assert!(tmp.path().join("three").is_dir());
        assert!(r.message.starts_with("mkdir: blocker/two:"));
        assert_eq!(r.message.lines().count(), 1);
    }

    #[test]
    fn rm_continues_after_missing_target() {
        let (tmp, reg, mut s) = setup();
        fs::write(tmp.path().join("a.txt"), "").unwrap();
        fs::write(tmp.path().join("c.txt"), "").unwrap();
        let r = run(&reg, &mut s, "del a.txt b.txt c.txt");
        assert_eq!(r.status, Status::Ok);
        assert_eq!(r.message, "rm: b.txt: No such file or directory");
        assert!(!tmp.path().join("a.txt").exists());
        assert!(!tmp.path().join("c.txt").exists());
    }

    #[test]
    fn rm_all_missing_is_error() {
        let (_tmp, reg, mut s) = setup();
        let r = run(&reg, &mut s, "rm nope");
        assert_eq!(r.status, Status::Error);
        assert_eq!(r.kind, Some(ErrorKind::NotFound));
    }

    #[test]
    fn rmdir_requires_empty_unless_recursive() {
        let (tmp, reg, mut s) = setup();
        fs::create_dir_all(tmp.path().join("full/deep")).unwrap();
        let r = run(&reg, &mut s, "rmdir full");
        assert_eq!(r.kind, Some(ErrorKind::NotEmpty));
        assert!(tmp.path().join("full").exists());
        let r = run(&reg, &mut s, "rmdir -r full");
        assert!(r.is_ok());
        assert!(!tmp.path().join("full").exists());
    }

    #[test]
    fn rmdir_flag_alone_is_missing_operand() {
        let (_tmp, reg, mut s) = setup();
        let err = exec(&reg, &mut s, "rmdir -r").unwrap_err();
        assert!(matches!(err, TermError::InvalidArgument(_)));
    }

    #[test]
    fn missing_operand_is_invalid_argument() {
        let (_tmp, reg, mut s) = setup();
        for line in ["mkdir", "rm", "touch", "cat", "cp a", "mv", "edit"] {
            let r = run(&reg, &mut s, line);
            assert_eq!(r.kind, Some(ErrorKind::InvalidArgument), "{line}");
            assert_eq!(r.status, Status::Error, "{line}");
        }
    }

    #[test]
    fn cat_single_and_multiple() {
        let (tmp, reg, mut s) = setup();
        fs::write(tmp.path().join("a"), "alpha\n").unwrap();
        fs::write(tmp.path().join("b"), "beta").unwrap();
        assert_eq!(run(&reg, &mut s, "cat a").message, "alpha");
        let r = run(&reg, &mut s, "cat a b");
        assert_eq!(r.message, "==> a <==\nalpha\n==> b <==\nbeta");
    }

    #[test]
    fn echo_prints_and_redirects() {
        let (tmp, reg, mut s) = setup();
        assert_eq!(run(&reg, &mut s, "echo hi there").message, "hi there");
        let r = run(&reg, &mut s, "echo hello world > greeting.txt");
        assert!(r.is_ok());
        assert_eq!(
            fs::read_to_string(tmp.path().join("greeting.txt")).unwrap(),
            "hello world"
        );
        assert_eq!(run(&reg, &mut s, "cat greeting.txt").message, "hello world");
    }

    #[test]
    fn echo_redirect_needs_exactly_one_target() {
        let (_tmp, reg, mut s) = setup();
        assert_eq!(
            run(&reg, &mut s, "echo hi >").kind,
            Some(ErrorKind::InvalidArgument)
        );
        assert_eq!(
            run(&reg, &mut s, "echo hi > a b").kind,
            Some(ErrorKind::InvalidArgument)
        );
    }

    #[test]
    fn edit_replaces_content() {
        let (tmp, reg, mut s) = setup();
        fs::write(tmp.path().join("notes.md"), "old old old").unwrap();
        exec(&reg, &mut s, "edit notes.md new text").unwrap();
        assert_eq!(
            fs::read_to_string(tmp.path().join("notes.md")).unwrap(),
            "new text"
        );
    }

    #[test]
    fn cp_and_mv() {
        let (tmp, reg, mut s) = setup();
        fs::write(tmp.path().join("a"), "data").unwrap();
        exec(&reg, &mut s, "cp a b").unwrap();
        exec(&reg, &mut s, "mv b c").unwrap();
        assert!(tmp.path().join("a").exists());
        assert!(!tmp.path().join("b").exists());
        assert_eq!(fs::read_to_string(tmp.path().join("c")).unwrap(), "data");
        let r = run(&reg, &mut s, "cp a b c");
        assert_eq!(r.message, "cp: extra operand 'c'");
    }

    #[test]
    fn count_reports_totals() {
        let (tmp, reg, mut s) = setup();
        fs::write(tmp.path().join("f"), "").unwrap();
        fs::create_dir(tmp.path().join("d")).unwrap();
        let r = run(&reg, &mut s, "count");
        assert_eq!(r.message, "Files: 1\nDirectories: 1\nTotal items: 2");
    }

    #[test]
    fn history_shows_last_twenty_numbered() {
        let (_tmp, reg, mut s) = setup();
        assert_eq!(run(&reg, &mut s, "history").message, "(no history)");
        for i in 1..=25 {
            s.push_history(&format!("echo {i}"));
        }
        let r = run(&reg, &mut s, "history");
        let lines: Vec<&str> = r.message.lines().collect();
        assert_eq!(lines.len(), 20);
        assert_eq!(lines[0], "   6  echo 6");
        assert_eq!(lines[19], "  25  echo 25");
    }

    #[test]
    fn help_groups_by_category() {
        let (_tmp, reg, mut s) = setup();
        let r = run(&reg, &mut s, "help");
        assert!(r.message.contains("filesystem:"));
        assert!(r.message.contains("system:"));
        assert!(r.message.contains("ls/dir"));
        let r = run(&reg, &mut s, "help del");
        assert!(r.message.starts_with("rm - Remove files"));
        let r = run(&reg, &mut s, "help nope");
        assert_eq!(r.kind, Some(ErrorKind::InvalidArgument));
    }

    #[test]
    fn signals_and_info() {
        let (_tmp, reg, mut s) = setup();
        assert!(matches!(exec(&reg, &mut s, "cls").unwrap(), CommandOutput::Clear));
        assert!(matches!(exec(&reg, &mut s, "QUIT").unwrap(), CommandOutput::Exit));
        assert!(run(&reg, &mut s, "ai").message.contains("built-in patterns"));
        assert!(run(&reg, &mut s, "version").message.starts_with("nlterm "));
    }
}
