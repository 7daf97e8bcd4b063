//! Front-panel style monitor: examine and deposit memory, step the CPU, load and dump images.
//! All numbers typed at the prompt are hexadecimal.

use std::{fs, io::{self, BufRead, Write}};

use i8008_core_emulator::{
    check_address, check_byte, mask_address, Core, Memory, Ram, RequestError, Register, MEMORY_SIZE,
};
use i8008_utils::{assemble, dump_image, load_image, AssembleError};
use thiserror::Error;

pub const MONITOR_PROMPT: &str = "> ";

pub const LISTED_COMMANDS: [&str; 12] = [
    "help", "quit", "examine", "deposit", "depositnext", "dump", "step", "run", "load", "asm", "pc", "regs",
];

/// Aliases for each command, and its usage lines.
const HELP_TOPICS: [(&[&str], &[&str]); 12] = [
    (&["help", "h"], &[
        "help -- list the available commands",
        "help [command] -- show usage for a command",
    ]),
    (&["quit", "q", "exit"], &[
        "quit -- halt the CPU and close the monitor",
    ]),
    (&["examine", "e", "peek"], &[
        "examine -- show the byte at the program counter",
        "examine [address] -- show the byte at address, and move the program counter there",
        "examine [start] [end] -- show bytes from start to end inclusive, and move the program counter to end",
    ]),
    (&["deposit", "d", "poke"], &[
        "deposit [value] -- write a value at the program counter",
        "deposit [address] [value] -- write a value at address, leaving the program counter alone",
        "see also: depositnext",
    ]),
    (&["depositnext", "dn"], &[
        "depositnext [value] -- advance the program counter (wrapping at 3fff), then write a value there",
    ]),
    (&["dump"], &[
        "dump -- show all of memory",
        "dump [filename] -- write a raw memory image to a file",
    ]),
    (&["step", "s"], &[
        "step -- execute one instruction",
        "step [count] -- execute count instructions, stopping early on HALT (at most the step budget)",
    ]),
    (&["run"], &[
        "run -- execute until HALT, or until the step budget runs out",
    ]),
    (&["load", "l"], &[
        "load [filename] -- load a raw memory image at address 0",
    ]),
    (&["asm"], &[
        "asm [filename] -- assemble 8008 source and load it at address 0",
    ]),
    (&["pc"], &[
        "pc -- show the program counter",
        "pc [address] -- set the program counter",
    ]),
    (&["regs", "r"], &[
        "regs -- show registers, flags and the stack",
    ]),
];

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("'{0}' is not a hex number")]
    InvalidNumber(String),

    #[error("{0}")]
    Request(#[from] RequestError),

    #[error("{start:x} is greater than {end:x}. Please try examining forwards.")]
    BackwardsRange { start: u16, end: u16 },

    #[error("can't step {count:x} times, the step budget is {limit:x}")]
    StepBudget { count: usize, limit: usize },

    #[error("couldn't open {path}: {source}")]
    File { path: String, source: io::Error },

    #[error("{0}")]
    Assemble(#[from] AssembleError),

    /// Wrong number of arguments. Shows the help for the given topic.
    #[error("usage: help {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Output(#[from] io::Error),
}

fn parse_hex(arg: &str) -> Result<u32, CommandError> {
    let digits = arg.strip_prefix("0x").unwrap_or(arg);
    u32::from_str_radix(digits, 16).map_err(|_| CommandError::InvalidNumber(arg.to_string()))
}

fn parse_address(arg: &str) -> Result<u16, CommandError> {
    Ok(check_address(parse_hex(arg)? as usize)?)
}

fn parse_value(arg: &str) -> Result<u8, CommandError> {
    Ok(check_byte(parse_hex(arg)?)?)
}

pub struct Monitor<'m, R: BufRead, W: Write> {
    core: Core<'m, Ram>,
    input: R,
    output: W,
    max_steps: usize,
    running: bool,
}

impl<'m, R: BufRead, W: Write> Monitor<'m, R, W> {
    pub fn new(core: Core<'m, Ram>, input: R, output: W, max_steps: usize) -> Self {
        Self {
            core,
            input,
            output,
            max_steps,
            running: true,
        }
    }

    /// Reads and executes commands until `quit` or the end of input.
    pub fn run(&mut self) -> io::Result<()> {
        let mut line = String::new();

        while self.running {
            write!(self.output, "{MONITOR_PROMPT}")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }

            self.execute_line(&line)?;
        }

        Ok(())
    }

    pub fn execute_line(&mut self, line: &str) -> io::Result<()> {
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = args.split_first() else {
            return Ok(());
        };

        let result = match command {
            "q" | "quit" | "exit" => {
                self.running = false;
                self.core.halt();
                Ok(())
            }
            "e" | "examine" | "peek" => self.examine(args),
            "dump" => self.dump(args),
            "h" | "help" => self.help(args.first().copied().unwrap_or("")),
            "d" | "deposit" | "poke" => self.deposit(args),
            "dn" | "depositnext" => self.deposit_next(args),
            "s" | "step" => self.step(args),
            "run" => self.run_until_halt(args),
            "l" | "load" => self.load(args),
            "asm" => self.assemble(args),
            "pc" => self.program_counter(args),
            "r" | "regs" => self.registers(args),
            _ => {
                writeln!(self.output, "Unknown command. Type \"help\" for a list of valid commands.")?;
                Ok(())
            }
        };

        match result {
            Ok(()) => Ok(()),
            Err(CommandError::Output(err)) => Err(err),
            Err(CommandError::Usage(topic)) => match self.help(topic) {
                Err(CommandError::Output(err)) => Err(err),
                _ => Ok(()),
            },
            Err(err) => writeln!(self.output, "{err}"),
        }
    }

    fn current_address(&self) -> u16 {
        mask_address(self.core.program_counter)
    }

    fn examine(&mut self, args: &[&str]) -> Result<(), CommandError> {
        match args {
            [] => {
                let value = self.core.memory().read_byte(self.current_address());
                writeln!(self.output, "{value:02x}")?;
            }
            [address] => {
                let address = parse_address(address)?;
                let value = self.core.memory().read_byte(address);
                writeln!(self.output, "{value:02x}")?;
                self.core.program_counter = address;
            }
            [start, end] => {
                let start = parse_address(start)?;
                let end = parse_address(end)?;
                if start > end {
                    return Err(CommandError::BackwardsRange { start, end });
                }
                self.hex_dump(start, end)?;
                self.core.program_counter = end;
            }
            _ => return Err(CommandError::Usage("examine")),
        }
        Ok(())
    }

    /// Prints `start..=end` in rows of 16, with a gap after the eighth byte.
    fn hex_dump(&mut self, start: u16, end: u16) -> io::Result<()> {
        let bytes = self.core.memory().read_bytes(start, usize::from(end - start) + 1);

        for (row, chunk) in bytes.chunks(16).enumerate() {
            write!(self.output, "0x{:04x}: ", usize::from(start) + row * 16)?;
            for (i, byte) in chunk.iter().enumerate() {
                if i == 8 {
                    write!(self.output, " ")?;
                }
                write!(self.output, " {byte:02x}")?;
            }
            writeln!(self.output)?;
        }
        Ok(())
    }

    fn dump(&mut self, args: &[&str]) -> Result<(), CommandError> {
        match args {
            [] => self.hex_dump(0, (MEMORY_SIZE - 1) as u16)?,
            [path] => {
                writeln!(self.output, "Writing file...")?;
                dump_image(path, self.core.memory().bytes()).map_err(|source| CommandError::File {
                    path: path.to_string(),
                    source,
                })?;
                writeln!(self.output, "Done.")?;
            }
            _ => return Err(CommandError::Usage("dump")),
        }
        Ok(())
    }

    fn deposit(&mut self, args: &[&str]) -> Result<(), CommandError> {
        match args {
            [value] => {
                let value = parse_value(value)?;
                let address = self.current_address();
                self.core.memory_mut().write_byte(address, value);
            }
            [address, value] => {
                let value = parse_value(value)?;
                let address = parse_address(address)?;
                self.core.memory_mut().write_byte(address, value);
            }
            _ => return Err(CommandError::Usage("deposit")),
        }
        Ok(())
    }

    fn deposit_next(&mut self, args: &[&str]) -> Result<(), CommandError> {
        let [value] = args else {
            return Err(CommandError::Usage("depositnext"));
        };
        let value = parse_value(value)?;

        self.core.program_counter = mask_address(self.core.program_counter.wrapping_add(1));
        let address = self.current_address();
        self.core.memory_mut().write_byte(address, value);
        Ok(())
    }

    fn step(&mut self, args: &[&str]) -> Result<(), CommandError> {
        let count = match args {
            [] => 1,
            [count] => parse_hex(count)? as usize,
            _ => return Err(CommandError::Usage("step")),
        };
        if count > self.max_steps {
            return Err(CommandError::StepBudget { count, limit: self.max_steps });
        }

        for _ in 0..count {
            self.core.step();
            if self.core.is_halted() {
                writeln!(self.output, "HALT")?;
                break;
            }
        }
        Ok(())
    }

    fn run_until_halt(&mut self, args: &[&str]) -> Result<(), CommandError> {
        if !args.is_empty() {
            return Err(CommandError::Usage("run"));
        }

        let executed = self.core.execute_until_halt(self.max_steps);
        if self.core.is_halted() {
            writeln!(self.output, "HALT")?;
        } else {
            writeln!(self.output, "Stopped after {executed:x} steps without halting.")?;
        }
        Ok(())
    }

    fn load(&mut self, args: &[&str]) -> Result<(), CommandError> {
        let [path] = args else {
            return Err(CommandError::Usage("load"));
        };

        writeln!(self.output, "Reading file...")?;
        load_image(path, self.core.memory_mut().bytes_mut()).map_err(|source| CommandError::File {
            path: path.to_string(),
            source,
        })?;
        writeln!(self.output, "Done.")?;
        Ok(())
    }

    fn assemble(&mut self, args: &[&str]) -> Result<(), CommandError> {
        let [path] = args else {
            return Err(CommandError::Usage("asm"));
        };

        let code = fs::read_to_string(path).map_err(|source| CommandError::File {
            path: path.to_string(),
            source,
        })?;
        let program = assemble(&code)?;
        self.core.memory_mut().load_program(&program);
        writeln!(self.output, "Assembled {:x} bytes.", program.len())?;
        Ok(())
    }

    fn program_counter(&mut self, args: &[&str]) -> Result<(), CommandError> {
        match args {
            [] => writeln!(self.output, "{:x}", self.core.program_counter)?,
            [address] => self.core.program_counter = parse_address(address)?,
            _ => return Err(CommandError::Usage("pc")),
        }
        Ok(())
    }

    fn registers(&mut self, args: &[&str]) -> Result<(), CommandError> {
        if !args.is_empty() {
            return Err(CommandError::Usage("regs"));
        }

        for register in Register::ALL {
            write!(self.output, "{}={:02x} ", register.name(), self.core.register(register))?;
        }
        writeln!(self.output, "M={:04x}", self.core.registers.m())?;

        let flags = self.core.flags;
        writeln!(
            self.output,
            "S={} Z={} P={} C={} PC={:04x} SP={}",
            u8::from(flags.sign),
            u8::from(flags.zero),
            u8::from(flags.parity),
            u8::from(flags.carry),
            self.core.program_counter,
            self.core.stack.pointer(),
        )?;

        let stack: Vec<String> = self.core.stack.entries().iter().map(|a| format!("{a:04x}")).collect();
        writeln!(self.output, "stack: [{}]", stack.join(" "))?;
        Ok(())
    }

    fn help(&mut self, topic: &str) -> Result<(), CommandError> {
        if topic.is_empty() {
            writeln!(self.output, "Available commands are:")?;
            writeln!(self.output, "{}", LISTED_COMMANDS.join(" "))?;
            writeln!(self.output, "Type help [command] for more help.")?;
            writeln!(self.output, "All numerical values are to be entered in hex.")?;
            return Ok(());
        }

        match HELP_TOPICS.iter().find(|(aliases, _)| aliases.contains(&topic)) {
            Some((aliases, usage)) => {
                match aliases {
                    [name] => writeln!(self.output, "{name}")?,
                    [name, rest @ ..] => writeln!(self.output, "{name} (also {})", rest.join(", "))?,
                    [] => {}
                }
                writeln!(self.output, "USAGE:")?;
                for line in *usage {
                    writeln!(self.output, "  {line}")?;
                }
            }
            None => writeln!(self.output, "No help available for {topic}")?,
        }
        Ok(())
    }
}
