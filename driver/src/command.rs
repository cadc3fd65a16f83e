// Copyright 2024 Kevin Ludwig
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

//! One variant per token in the command surface, plus the whitespace
//! tokenizer that produces them. Malformed arity or non-integer
//! arguments parse to `None`, which the dispatcher turns into the
//! literal `"error"` response.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Init,
    Create(String),
    Destroy(String),
    Open(String),
    Close(usize),
    Read { slot: usize, offset: usize, count: usize },
    Write { slot: usize, offset: usize, count: usize },
    Seek { slot: usize, position: usize },
    Directory,
    WriteMemory { offset: usize, text: String },
    ReadMemory { offset: usize, count: usize },
}

impl Command {
    pub fn parse(line: &str) -> Option<Command> {
        let mut tokens = line.split_whitespace();
        let command = match tokens.next()? {
            "in" => Command::Init,
            "cr" => Command::Create(single_arg(tokens)?),
            "de" => Command::Destroy(single_arg(tokens)?),
            "op" => Command::Open(single_arg(tokens)?),
            "cl" => Command::Close(single_int(tokens)?),
            "rd" => {
                let (slot, offset, count) = triple_int(tokens)?;
                Command::Read { slot, offset, count }
            }
            "wr" => {
                let (slot, offset, count) = triple_int(tokens)?;
                Command::Write { slot, offset, count }
            }
            "sk" => {
                let (slot, position) = double_int(tokens)?;
                Command::Seek { slot, position }
            }
            "dr" => {
                if tokens.next().is_some() {
                    return None;
                }
                Command::Directory
            }
            "wm" => {
                let offset: usize = tokens.next()?.parse().ok()?;
                let words: Vec<&str> = tokens.collect();
                if words.is_empty() {
                    return None;
                }
                Command::WriteMemory {
                    offset,
                    text: words.join(" "),
                }
            }
            "rm" => {
                let (offset, count) = double_int(tokens)?;
                Command::ReadMemory { offset, count }
            }
            _ => return None,
        };
        Some(command)
    }
}

fn single_arg<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Option<String> {
    let value = tokens.next()?.to_string();
    tokens.next().is_none().then_some(value)
}

fn single_int<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Option<usize> {
    let value: usize = tokens.next()?.parse().ok()?;
    tokens.next().is_none().then_some(value)
}

fn double_int<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Option<(usize, usize)> {
    let a: usize = tokens.next()?.parse().ok()?;
    let b: usize = tokens.next()?.parse().ok()?;
    tokens.next().is_none().then_some((a, b))
}

fn triple_int<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Option<(usize, usize, usize)> {
    let a: usize = tokens.next()?.parse().ok()?;
    let b: usize = tokens.next()?.parse().ok()?;
    let c: usize = tokens.next()?.parse().ok()?;
    tokens.next().is_none().then_some((a, b, c))
}
