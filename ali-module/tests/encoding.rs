use ali_asm::{Instruction, Opcode};
use ali_module::{
    normalize, Command, Function, Grammar, Module, ModuleError, ModuleHeader, Rule, RuleSet,
    SymbolRef, WordTable,
};
use quickcheck_macros::quickcheck;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn words(names: &[&str]) -> WordTable {
    WordTable::new(names.iter().map(|n| n.to_string()).collect()).expect("canonical words")
}

fn instruction(op: Opcode, arg: i32) -> Instruction {
    Instruction::new(op, arg).expect("argument in range")
}

/// A small but fully populated module touching every chunk.
fn sample_module() -> Module {
    let functions = vec![
        Function::new(
            0,
            0,
            vec![
                instruction(Opcode::LLI, -1),
                instruction(Opcode::LLI, 0),
                instruction(Opcode::CAL, 2),
                instruction(Opcode::RET, 0),
            ],
        )
        .unwrap(),
        Function::new(
            1,
            2,
            vec![
                instruction(Opcode::LDL, 0),
                instruction(Opcode::JNP, 2),
                instruction(Opcode::LDL, 1),
                instruction(Opcode::RET, 1),
                instruction(Opcode::LLI, -1),
                instruction(Opcode::RET, 1),
            ],
        )
        .unwrap(),
    ];

    let grammar = Grammar::new(
        vec![
            RuleSet::new(vec![
                Rule::new(vec![SymbolRef::Terminal(0)]),
                Rule::new(vec![SymbolRef::Terminal(1)]),
            ]),
            RuleSet::new(vec![
                Rule::empty(),
                Rule::new(vec![SymbolRef::Terminal(2)]),
            ]),
            RuleSet::new(vec![Rule::new(vec![
                SymbolRef::NonTerminal(0),
                SymbolRef::NonTerminal(1),
            ])]),
        ],
        3,
    )
    .unwrap();

    Module::new(
        ModuleHeader {
            num_globals: 9,
            num_entities: 2,
            num_properties: 3,
            init_func: 0,
        },
        vec!["Hello, world!".into(), "A dark room.".into(), String::new()],
        functions,
        words(&["LOOK", "EXAMINE", "AROUND"]),
        grammar,
        vec![
            Command::new(SymbolRef::NonTerminal(2), -1, 0),
            Command::new(SymbolRef::NonTerminal(2), 1, 0),
        ],
    )
    .unwrap()
}

fn random_word(rng: &mut StdRng) -> String {
    let len = rng.gen_range(1..=8);
    (0..len)
        .map(|_| (b'A' + rng.gen_range(0..26)) as char)
        .collect()
}

fn random_module(rng: &mut StdRng) -> Module {
    let strings: Vec<String> = (0..rng.gen_range(0..8))
        .map(|_| random_word(rng).to_lowercase())
        .collect();
    let word_list: Vec<String> = (0..rng.gen_range(1..8)).map(|_| random_word(rng)).collect();
    let num_words = word_list.len();
    let words = WordTable::new(word_list).unwrap();

    let opcodes = [
        Opcode::LLI,
        Opcode::POP,
        Opcode::LDL,
        Opcode::STL,
        Opcode::LDG,
        Opcode::STG,
        Opcode::JMP,
        Opcode::JNP,
        Opcode::OP1,
        Opcode::OP2,
    ];
    let functions: Vec<Function> = (0..rng.gen_range(0..6))
        .map(|_| {
            let code = (0..rng.gen_range(0..12))
                .map(|_| {
                    let op = opcodes[rng.gen_range(0..opcodes.len())];
                    instruction(op, rng.gen_range(Instruction::MIN_ARGUMENT..=Instruction::MAX_ARGUMENT))
                })
                .collect();
            Function::new(rng.gen_range(0..=1), rng.gen_range(0..4), code).unwrap()
        })
        .collect();

    let mut sets = Vec::new();
    for index in 0..rng.gen_range(0..6usize) {
        let rules = (0..rng.gen_range(1..4))
            .map(|_| {
                let refs = (0..rng.gen_range(0..3))
                    .map(|_| {
                        if index > 0 && rng.gen_bool(0.3) {
                            SymbolRef::NonTerminal(rng.gen_range(0..index))
                        } else if rng.gen_bool(0.1) {
                            SymbolRef::None
                        } else {
                            SymbolRef::Terminal(rng.gen_range(0..num_words))
                        }
                    })
                    .collect();
                Rule::new(refs)
            })
            .collect();
        sets.push(RuleSet::new(rules));
    }
    let grammar = Grammar::new(sets, num_words).unwrap();

    let commands = (0..rng.gen_range(0..5))
        .map(|_| {
            let symbol = if !grammar.is_empty() && rng.gen_bool(0.7) {
                SymbolRef::NonTerminal(rng.gen_range(0..grammar.len()))
            } else {
                SymbolRef::Terminal(rng.gen_range(0..num_words))
            };
            let guard = if rng.gen_bool(0.5) {
                -1
            } else {
                rng.gen_range(0..4)
            };
            Command::new(symbol, guard, rng.gen_range(0..4))
        })
        .collect();

    Module::new(
        ModuleHeader {
            num_globals: rng.gen_range(0..16),
            num_entities: rng.gen_range(0..8),
            num_properties: rng.gen_range(0..8),
            init_func: -1,
        },
        strings,
        functions,
        words,
        grammar,
        commands,
    )
    .unwrap()
}

#[test]
fn sample_round_trip_is_byte_exact() {
    let module = sample_module();
    let bytes = module.to_bytes();

    let loaded = Module::from_bytes(&bytes).expect("sample module loads");
    assert_eq!(loaded, module);
    assert_eq!(loaded.to_bytes(), bytes);
}

#[test]
fn random_round_trips_are_byte_exact() {
    let rng = &mut StdRng::seed_from_u64(2322u64);
    for _ in 0..50 {
        let module = random_module(rng);
        let bytes = module.to_bytes();
        let loaded = Module::from_bytes(&bytes).expect("random module loads");
        assert_eq!(loaded, module);
        assert_eq!(loaded.to_bytes(), bytes);
    }
}

#[test]
fn truncated_modules_never_load() {
    let mut bytes = sample_module().to_bytes();
    while !bytes.is_empty() {
        bytes.pop();
        assert!(
            Module::from_bytes(&bytes).is_err(),
            "truncated module of {} bytes should fail",
            bytes.len()
        );
    }
}

#[test]
fn outer_signature_is_checked() {
    let mut bytes = sample_module().to_bytes();
    bytes[0] = b'X';
    assert_eq!(Module::from_bytes(&bytes), Err(ModuleError::BadSignature));

    let mut bytes = sample_module().to_bytes();
    bytes[8] = b'X';
    assert_eq!(Module::from_bytes(&bytes), Err(ModuleError::BadSignature));
}

#[test]
fn chunk_order_is_fixed() {
    // Swap the STR and WRD chunk ids; both chunk reads should then
    // mismatch their expected position.
    let bytes = sample_module().to_bytes();
    let str_pos = find_tag(&bytes, b"STR ");
    let wrd_pos = find_tag(&bytes, b"WRD ");
    let mut swapped = bytes.clone();
    swapped[str_pos..str_pos + 4].copy_from_slice(b"WRD ");
    swapped[wrd_pos..wrd_pos + 4].copy_from_slice(b"STR ");
    assert!(matches!(
        Module::from_bytes(&swapped),
        Err(ModuleError::UnexpectedChunk { .. })
    ));
}

#[test]
fn bad_version_is_rejected() {
    let bytes = sample_module().to_bytes();
    let mod_pos = find_tag(&bytes, b"MOD ");
    let mut patched = bytes.clone();
    patched[mod_pos + 8] = 0x02; // major version byte
    assert_eq!(
        Module::from_bytes(&patched),
        Err(ModuleError::UnsupportedVersion { major: 2, minor: 0 })
    );

    // A different minor version is fine.
    let mut patched = bytes;
    patched[mod_pos + 9] = 0x07;
    assert!(Module::from_bytes(&patched).is_ok());
}

#[test]
fn missing_function_terminator_is_rejected() {
    let module = sample_module();
    let bytes = module.to_bytes();
    let fun_pos = find_tag(&bytes, b"FUN ");
    let fun_size = u32::from_be_bytes(bytes[fun_pos + 4..fun_pos + 8].try_into().unwrap()) as usize;

    // Overwrite the final terminator with a live instruction.
    let mut patched = bytes;
    let last_instr = fun_pos + 8 + fun_size - 4;
    patched[last_instr] = Opcode::RET as u8;
    patched[last_instr + 3] = 0;
    assert_eq!(
        Module::from_bytes(&patched),
        Err(ModuleError::MalformedCode)
    );
}

#[test]
fn forward_grammar_reference_is_rejected() {
    let module = sample_module();
    let bytes = module.to_bytes();
    let grm_pos = find_tag(&bytes, b"GRM ");

    // First symbol ref of the first rule: nnonterm, nrules, nrefs,
    // nrule0, nref0, then the ref itself.
    let ref_pos = grm_pos + 8 + 5 * 4;
    let mut patched = bytes;
    patched[ref_pos..ref_pos + 4].copy_from_slice(&1i32.to_be_bytes());
    assert_eq!(
        Module::from_bytes(&patched),
        Err(ModuleError::ForwardReference { index: 0, target: 0 })
    );
}

#[test]
fn extra_command_sets_are_ignored() {
    let module = sample_module();
    let mut bytes = module.to_bytes();

    // Append a second, empty command set to the CMD chunk.
    let cmd_pos = find_tag(&bytes, b"CMD ");
    let cmd_size = u32::from_be_bytes(bytes[cmd_pos + 4..cmd_pos + 8].try_into().unwrap());
    bytes[cmd_pos + 4..cmd_pos + 8].copy_from_slice(&(cmd_size + 4).to_be_bytes());
    bytes[cmd_pos..cmd_pos + 4].copy_from_slice(b"CMD ");
    let insert_at = cmd_pos + 8 + cmd_size as usize;
    for (offset, byte) in 0i32.to_be_bytes().iter().enumerate() {
        bytes.insert(insert_at + offset, *byte);
    }
    bytes[cmd_pos + 8..cmd_pos + 12].copy_from_slice(&2i32.to_be_bytes());

    // Fix up the FORM size.
    let form_size = u32::from_be_bytes(bytes[4..8].try_into().unwrap());
    bytes[4..8].copy_from_slice(&(form_size + 4).to_be_bytes());

    let loaded = Module::from_bytes(&bytes).expect("extra sets are skipped");
    assert_eq!(loaded.commands(), module.commands());
}

#[test]
fn zero_command_sets_are_rejected() {
    let module = sample_module();
    let mut bytes = module.to_bytes();
    let cmd_pos = find_tag(&bytes, b"CMD ");
    bytes[cmd_pos + 8..cmd_pos + 12].copy_from_slice(&0i32.to_be_bytes());
    // The two commands are now trailing bytes of the chunk, but the set
    // count is checked first.
    assert_eq!(Module::from_bytes(&bytes), Err(ModuleError::NoCommandSets));
}

#[test]
fn non_canonical_words_are_rejected_at_load() {
    let bytes = sample_module().to_bytes();
    let wrd_pos = find_tag(&bytes, b"WRD ");
    let word_pos = wrd_pos
        + bytes[wrd_pos..]
            .windows(5)
            .position(|w| w == b"LOOK\0")
            .expect("word LOOK present");

    let mut patched = bytes;
    patched[word_pos] = b'l';
    assert_eq!(
        Module::from_bytes(&patched),
        Err(ModuleError::MalformedWord { index: 0 })
    );
}

#[test]
fn function_result_count_is_checked_at_load() {
    let bytes = sample_module().to_bytes();
    let fun_pos = find_tag(&bytes, b"FUN ");
    // First header: reserved u16, then the result-count byte.
    let mut patched = bytes;
    patched[fun_pos + 8 + 4 + 2] = 2;
    assert_eq!(
        Module::from_bytes(&patched),
        Err(ModuleError::InvalidResultCount { index: 0, nret: 2 })
    );
}

#[test]
fn reserved_header_field_must_be_zero() {
    let bytes = sample_module().to_bytes();
    let mod_pos = find_tag(&bytes, b"MOD ");
    let mut patched = bytes;
    patched[mod_pos + 11] = 1;
    assert!(Module::from_bytes(&patched).is_err());
}

#[quickcheck]
fn normalization_is_idempotent(input: String) -> bool {
    let once = normalize(&input);
    normalize(&once) == once
}

#[quickcheck]
fn normalized_output_is_canonical(input: String) -> bool {
    let once = normalize(&input);
    !once.starts_with(' ') && !once.ends_with(' ') && !once.contains("  ")
}

fn find_tag(bytes: &[u8], tag: &[u8; 4]) -> usize {
    bytes
        .windows(4)
        .position(|w| w == tag)
        .unwrap_or_else(|| panic!("tag {:?} not found", String::from_utf8_lossy(tag)))
}
